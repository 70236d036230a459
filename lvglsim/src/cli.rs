//! Command-line argument parsing.

use clap::Parser;

/// lvglsim - embedded display simulator
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "lvglsim")]
#[command(about = "lvglsim - embedded display simulator")]
#[command(disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Args {
    /// Print the toolkit version and exit
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// List the supported backends and exit
    #[arg(short = 'B', long = "list-backends")]
    pub list_backends: bool,

    /// Backend to use (see -B)
    #[arg(short = 'b', long, value_name = "NAME")]
    pub backend: Option<String>,

    /// Start in fullscreen
    #[arg(short = 'f', long)]
    pub fullscreen: bool,

    /// Start maximized
    #[arg(short = 'm', long)]
    pub maximize: bool,

    /// Window width in pixels (overrides LV_SIM_WINDOW_WIDTH)
    #[arg(short = 'W', long, value_name = "PIXELS", allow_negative_numbers = true)]
    pub width: Option<i32>,

    /// Window height in pixels (overrides LV_SIM_WINDOW_HEIGHT)
    #[arg(short = 'H', long, value_name = "PIXELS", allow_negative_numbers = true)]
    pub height: Option<i32>,
}

/// What the command line asks for besides running the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PrintVersion,
    ListBackends,
    Run,
}

impl Args {
    /// `-V` wins over `-B`; both skip orchestration.
    pub fn action(&self) -> Action {
        if self.version {
            Action::PrintVersion
        } else if self.list_backends {
            Action::ListBackends
        } else {
            Action::Run
        }
    }
}
