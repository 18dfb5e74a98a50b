use candle_core::Device;
use tracing::info;

/// Metal when requested, compiled in and present; CPU otherwise.
pub fn select_device(prefer_gpu: bool) -> Device {
    #[cfg(feature = "metal")]
    {
        if prefer_gpu {
            if let Ok(dev) = Device::new_metal(0) {
                info!("Device: Metal (MPS)");
                return dev;
            }
        }
    }
    #[cfg(not(feature = "metal"))]
    let _ = prefer_gpu;
    info!("Device: CPU");
    Device::Cpu
}
