use burn::backend::Autodiff;

#[cfg(not(feature = "tch"))]
mod selected {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    /// The CPU backend
    pub type Backend = NdArray;

    /// The default CPU device
    pub fn device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }

    /// The backend name for logs
    pub const NAME: &str = "ndarray";
}

#[cfg(feature = "tch")]
mod selected {
    use burn::backend::{libtorch::LibTorchDevice, LibTorch};

    /// The LibTorch backend
    pub type Backend = LibTorch;

    /// The first CUDA device
    pub fn device() -> LibTorchDevice {
        LibTorchDevice::Cuda(0)
    }

    /// The backend name for logs
    pub const NAME: &str = "libtorch";
}

pub use selected::{device, Backend as InferenceBackend, NAME as BACKEND_NAME};

/// The backend binaries train on
pub type TrainingBackend = Autodiff<InferenceBackend>;
