pub mod generic_image;
pub mod modis;
pub mod types;

pub use generic_image::ImageReader;
pub use modis::ModisHdfReader;
pub use types::{BandReader, Data, ReadError};

// Format readers the scene loader can be asked for, by the names the
// pipeline configuration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    ModisL1b,
    GenericImage,
}

pub fn create_reader(kind: ReaderKind) -> Box<dyn BandReader> {
    match kind {
        ReaderKind::ModisL1b => Box::new(ModisHdfReader),
        ReaderKind::GenericImage => Box::new(ImageReader),
    }
}
