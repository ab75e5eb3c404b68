//! Built-in IO templates available to every script.

use crate::foundation::error::LiveMixResult;
use crate::script::compiler::compile;
use crate::script::program::Program;

/// Prelude source, written in the script grammar itself.
pub const PRELUDE: &str = "\
// Audio file decoder.
raw mp3input 1 filesrc name=src ! decodebin ! audioconvert ! audioresample ! proxysink name=audio_out
src location string $1
war

// Video file decoder with both streams exported.
raw mp4input 1 filesrc name=src ! decodebin name=demux demux. ! videoconvert ! proxysink name=video_out demux. ! audioconvert ! audioresample ! proxysink name=audio_out
src location string $1
war

// Sound card output.
raw aoutput 0 proxysrc name=audio_in ! alsasink name=sink
war

// On-screen window at x y width height.
raw xoutput 4 proxysrc name=video_in ! xvimagesink name=sink
raw gtktag string window
raw x int $1
raw y int $2
raw width int $3
raw height int $4
war
";

/// Compile the prelude.
pub fn program() -> LiveMixResult<Program> {
    compile(PRELUDE)
}

#[cfg(test)]
#[path = "../../tests/unit/script/prelude.rs"]
mod tests;
