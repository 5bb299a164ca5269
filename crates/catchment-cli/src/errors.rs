use catchment_core::CatchmentError;
use console::style;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    /// Map an error chain onto a message with remedies
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let catchment = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<CatchmentError>());

        let Some(inner) = catchment else {
            return CliError::new(error.to_string());
        };

        let base = CliError::new(error.to_string());
        let base = if error.to_string() != inner.to_string() {
            base.with_context(inner.to_string())
        } else {
            base
        };

        match inner {
            CatchmentError::FileNotFound { .. } => base
                .with_suggestion("Check the path and try again")
                .with_help("Run: catchment run --help"),
            CatchmentError::UnsupportedFormat { .. } => base
                .with_suggestion("Centres must be a Shapefile (.shp) or GeoJSON (.geojson, .json)")
                .with_suggestion("Scored output must be .geojson, .json or .csv"),
            CatchmentError::MissingColumn { .. } => base
                .with_suggestion("Name the coordinate columns with --lon-field and --lat-field"),
            CatchmentError::InvalidCoordinate { .. } => base
                .with_suggestion("Every property row needs numeric longitude and latitude values"),
            CatchmentError::UnsupportedGeometry { .. } => base
                .with_suggestion("Convert polygons or lines to representative points first"),
            CatchmentError::ProjectionFailed { .. } => base
                .with_suggestion("Check --source-crs and --target-crs")
                .with_suggestion("Declare the centre CRS in a .prj file or a GeoJSON crs member"),
            CatchmentError::InvalidRadius { .. } => base
                .with_suggestion("Pass a positive distance: --search-radius 400"),
            CatchmentError::CoincidentPoints { .. } => base
                .with_suggestion("A property sits exactly on a centre; check for duplicated coordinates"),
            CatchmentError::OutputExists { .. } => base
                .with_suggestion("Choose another --output path")
                .with_suggestion("Or drop --no-overwrite"),
            CatchmentError::ConfigInvalid { .. } => base
                .with_suggestion("Check catchment.toml and CATCHMENT_* variables")
                .with_help("Run: catchment config"),
            _ => base,
        }
    }

    pub fn display(&self, json: bool) {
        if json {
            let output = serde_json::json!({
                "status": "error",
                "message": self.message,
                "context": self.context,
                "suggestions": self.suggestions,
            });
            eprintln!("{}", output);
            return;
        }

        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
