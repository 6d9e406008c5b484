use anyhow::{Context, Result};
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

fn get_host() -> cpal::Host {
    cpal::default_host()
}

/// The input device called `device_name`, or the host's default input.
pub fn get_or_default_input(device_name: Option<&str>) -> Result<Device> {
    let host = get_host();
    tracing::debug!("Host: {:?}", host.id());

    let target = match device_name {
        Some(name) => name.to_string(),
        None => host
            .default_input_device()
            .context("No default input device")?
            .name()
            .context("Default input device has no name")?,
    };

    host.input_devices()
        .context("Failed to enumerate input devices")?
        .find(|device| device.name().is_ok_and(|name| name == target))
        .with_context(|| format!("No input device named '{}'", target))
}

/// The output device called `device_name`, or the host's default output.
pub fn get_or_default_output(device_name: Option<&str>) -> Result<Device> {
    let host = get_host();
    let target = match device_name {
        Some(name) => name.to_string(),
        None => host
            .default_output_device()
            .context("No default output device")?
            .name()
            .context("Default output device has no name")?,
    };

    host.output_devices()
        .context("Failed to enumerate output devices")?
        .find(|device| device.name().is_ok_and(|name| name == target))
        .with_context(|| format!("No output device named '{}'", target))
}

fn describe(name: &str, channels: u16, sample_rate: u32, is_default: bool) -> String {
    let mut d = format!(" * {}({}ch, {}hz)", name, channels, sample_rate);
    if is_default {
        d.push_str(" [default]");
    }
    d
}

/// One line per input device with its default channel count and rate.
pub fn get_available_inputs() -> Result<String> {
    for host in cpal::available_hosts() {
        tracing::debug!("Available host: {:?}", host);
    }

    let host = get_host();
    let default_device = host.default_input_device().and_then(|d| d.name().ok());

    let mut device_names = Vec::new();
    for device in host.input_devices().context("No input devices found")? {
        let Ok(name) = device.name() else {
            continue;
        };
        match device.default_input_config() {
            Ok(cfg) => device_names.push(describe(
                &name,
                cfg.channels(),
                cfg.sample_rate().0,
                default_device.as_deref() == Some(name.as_str()),
            )),
            Err(e) => tracing::debug!("Skipping input device {}: {}", name, e),
        }
    }
    Ok(device_names.join("\n"))
}

/// One line per output device with its default channel count and rate.
pub fn get_available_outputs() -> Result<String> {
    let host = get_host();
    let default_device = host.default_output_device().and_then(|d| d.name().ok());

    let mut device_names = Vec::new();
    for device in host.output_devices().context("No output devices found")? {
        let Ok(name) = device.name() else {
            continue;
        };
        match device.default_output_config() {
            Ok(cfg) => device_names.push(describe(
                &name,
                cfg.channels(),
                cfg.sample_rate().0,
                default_device.as_deref() == Some(name.as_str()),
            )),
            Err(e) => tracing::debug!("Skipping output device {}: {}", name, e),
        }
    }
    Ok(device_names.join("\n"))
}
