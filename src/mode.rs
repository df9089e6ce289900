/// Input context: which control currently owns the keyboard.
/// Browse is the default; everything else is a prompt or modal layered
/// over the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    GoTo,
    Filter,
    Fields,
    Sheets,
    Install,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Browse => "BROWSE",
            Mode::GoTo => "GO TO",
            Mode::Filter => "FILTER",
            Mode::Fields => "FIELDS",
            Mode::Sheets => "SHEETS",
            Mode::Install => "INSTALL",
        }
    }

    /// True while a text prompt owns typing, which suppresses the
    /// arrow-key record navigation.
    pub fn is_text_input(&self) -> bool {
        matches!(self, Mode::GoTo | Mode::Filter)
    }
}
