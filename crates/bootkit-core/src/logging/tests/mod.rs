

pub(crate) use recording::RecordingLogger;
