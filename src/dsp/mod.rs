pub mod pitch;
pub mod spectrogram;
pub mod windowing;
