use std::io::Cursor;
use std::sync::Arc;

use jcscript_lang::Asset;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Fire-and-forget playback of queued sound assets. Without an output device
/// every sound is dropped with a log line.
pub struct SoundPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl SoundPlayer {
    pub fn new() -> Self {
        let output = match OutputStream::try_default() {
            Ok(pair) => Some(pair),
            Err(err) => {
                log::warn!("audio output unavailable: {err}");
                None
            }
        };
        Self { output }
    }

    pub fn play(&self, asset: &Asset) {
        let Some((_, handle)) = &self.output else { return };
        let Ok(sink) = Sink::try_new(handle) else {
            log::warn!("could not open a sink for `{}`", asset.name);
            return;
        };
        let bytes: Arc<[u8]> = asset.data.clone();
        match Decoder::new(Cursor::new(bytes)) {
            Ok(source) => {
                sink.append(source);
                sink.detach();
            }
            Err(err) => log::warn!("failed to decode sound `{}`: {err}", asset.name),
        }
    }
}
