//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ragebait_models::Lens;

#[derive(Parser, Debug)]
#[command(
    name = "ragebait",
    version,
    about = "Submit clips for roasting and track the results"
)]
pub struct Cli {
    /// Backend base URL (overrides RAGEBAIT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a clip and wait for the roast
    Submit {
        /// Video or image file to upload
        file: PathBuf,
        /// Comedy lens, e.g. nature_documentary or "heist movie"
        #[arg(short, long, default_value = "nature_documentary")]
        lens: String,
        /// Extra JSON context passed to the commentary generator
        #[arg(long)]
        context: Option<String>,
    },
    /// Resolve a job or video id once
    Status {
        /// Job id or backend video id
        id: String,
    },
    /// Poll a job or video id until it resolves
    Watch {
        /// Job id or backend video id
        id: String,
    },
    /// Regenerate the meme for a video
    Meme {
        video_id: String,
        /// Frame to build the meme from
        #[arg(short, long)]
        frame: Option<u32>,
    },
    /// Animate a frame or meme of a finished video into a parody clip
    Parody {
        video_id: String,
        /// Motion preset (shake, zoom, stutter, fixed) or a free-form directive
        #[arg(short, long, default_value = "shake")]
        motion: String,
        /// Frame to animate when no meme is given
        #[arg(short, long, conflicts_with = "meme_url")]
        frame: Option<u32>,
        /// Animate this meme instead of a raw frame
        #[arg(long)]
        meme_url: Option<String>,
    },
    /// List the lenses the backend offers
    Lenses,
    /// List meme styles
    Styles,
    /// List meme templates
    Templates,
    /// Show backend health
    Health,
    /// Manage the local session history
    Sessions {
        #[command(subcommand)]
        command: SessionCommand,
    },
    /// Print the JSON schema of a roast result
    Schema,
}

/// Named motion presets for parody clips.
pub const MOTION_PRESETS: &[(&str, &str)] = &[
    ("shake", "subtle handheld broadcast camera shake"),
    ("zoom", "slow zoom-in, stadium lights flicker slightly"),
    ("stutter", "quick 0.5s replay stutter then smooth"),
    ("fixed", "overlay remains fixed, like TV graphics"),
];

/// Expand a motion preset name; other text is used as the directive as is.
pub fn motion_directive(motion: &str) -> &str {
    MOTION_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(motion.trim()))
        .map(|(_, directive)| *directive)
        .unwrap_or(motion)
}

/// Wire id and display name for a `--lens` value.
///
/// Built-in lenses are sent under their canonical id. Anything else is
/// passed through untouched so lenses added on the server keep working.
pub fn lens_names(raw: &str) -> (String, String) {
    match raw.parse::<Lens>() {
        Ok(lens) => (lens.as_str().to_string(), lens.display_name().to_string()),
        Err(_) => (raw.to_string(), raw.to_string()),
    }
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// List recorded sessions, newest first
    List,
    /// Forget a session
    Remove { id: String },
}
