use anyhow::{bail, Result};
use candle_core::Device;

/// Pick the inference device. `auto` prefers Metal, then CUDA, then CPU,
/// limited to the backends this crate was compiled with.
pub fn select_device(preference: &str) -> Result<Device> {
    match preference {
        "cpu" => Ok(Device::Cpu),
        "metal" => Ok(Device::new_metal(0)?),
        "cuda" => Ok(Device::new_cuda(0)?),
        "auto" => Ok(auto_device()),
        other => bail!("unknown device preference '{other}'"),
    }
}

fn auto_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            tracing::info!("device: Metal");
            return dev;
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(0) {
            tracing::info!("device: CUDA");
            return dev;
        }
    }
    tracing::info!("device: CPU");
    Device::Cpu
}
