//! Canned greetings

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const GREETINGS: [&str; 5] = ["hello!", "hi!", "howdy!", "hey!", "aloha!"];
pub const MORNING: &str = "Good morning lovely human! Make some great maps today.";

/// Greeting adapter; no network involved
pub struct Greeter<R = StdRng> {
    rng: Mutex<R>,
}

impl Greeter<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Greeter<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Greeter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    /// `hello`/`hi` wins over `morning`; `None` when neither appears
    pub fn greet(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        if text.contains("hello") || text.contains("hi") {
            let mut rng = self.rng.lock().ok()?;
            GREETINGS.choose(&mut *rng).map(|g| g.to_string())
        } else if text.contains("morning") {
            Some(MORNING.to_string())
        } else {
            None
        }
    }
}
