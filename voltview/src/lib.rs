pub mod acquisition;
pub mod app;
pub mod clock;
pub mod save;
pub mod source;
pub mod timer;
pub mod view;
pub mod viewport;

use argh::FromArgs;

#[derive(Debug, FromArgs, Clone)]
/// cli app args
pub struct Cli {
    /// settings file path
    #[argh(option, default = "String::from(\"voltview.json\")")]
    pub settings: String,
    /// directory csv exports are written to
    #[argh(option, default = "String::from(\"exports\")")]
    pub export_dir: String,
    /// stop measuring after this many seconds
    #[argh(option, default = "10")]
    pub seconds: u64,
    /// export a csv before exiting
    #[argh(switch)]
    pub export: bool,
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
}
