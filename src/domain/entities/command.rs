/// A command addressed to the bot, already normalized (trimmed, lowercase)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub raw_args: String,
}

impl Command {
    /// Split normalized text into a verb and its arguments.
    /// Returns `None` when there is no verb.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let mut parts = text.splitn(2, char::is_whitespace);
        let verb = parts.next().filter(|v| !v.is_empty())?;
        let raw_args = parts.next().unwrap_or("").trim();

        Some(Self {
            verb: verb.to_string(),
            raw_args: raw_args.to_string(),
        })
    }

    /// Full command text as the router sees it
    pub fn text(&self) -> String {
        if self.raw_args.is_empty() {
            self.verb.clone()
        } else {
            format!("{} {}", self.verb, self.raw_args)
        }
    }
}

/// A command together with the channel it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressed {
    pub command: Command,
    pub channel: String,
}

/// Help entry describing one supported verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub key: String,
    pub usage: String,
    pub example: String,
    pub explanation: String,
}

impl CommandSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            usage: String::new(),
            example: String::new(),
            explanation: String::new(),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// Ordered registry of help entries, iterated in declaration order
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The verbs the bot understands, with `example_verb` as the demo command
    pub fn defaults(example_verb: &str) -> Self {
        let mut registry = Self::new();
        registry.register(
            CommandSpec::new(example_verb)
                .with_usage(format!("{} something", example_verb))
                .with_example(format!("{} foo", example_verb))
                .with_explanation("will print annoying message"),
        );
        registry.register(
            CommandSpec::new("weather")
                .with_usage("weather location")
                .with_example("weather new york city")
                .with_explanation("will print current weather in new york city"),
        );
        registry.register(
            CommandSpec::new("xkcd")
                .with_usage("xkcd [latest]")
                .with_example("xkcd")
                .with_explanation("will print a random xkcd comic"),
        );
        registry.register(
            CommandSpec::new("latlng")
                .with_usage("latlng place name")
                .with_example("latlng 201 moore street, brooklyn, ny")
                .with_explanation("40.7127837, -74.0059413"),
        );
        registry.register(
            CommandSpec::new("data_obs")
                .with_usage("data observatory: _coming_soon_")
                .with_example("...")
                .with_explanation("will print a data observatory measure at the specified location"),
        );
        registry
    }

    /// Entries keep their registration order; a repeated key replaces in place
    pub fn register(&mut self, spec: CommandSpec) {
        match self.specs.iter_mut().find(|s| s.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }
}
