use log::debug;
use odex_patcher::{DeviceLayout, Getprop};

use crate::DeviceArgs;

/// Layout from the command line, falling back to the properties of the running device
pub(crate) fn resolve_layout(args: &DeviceArgs) -> DeviceLayout {
    if let (Some(sdk_int), Some(isa)) = (args.sdk, args.isa) {
        return DeviceLayout::new(sdk_int, isa);
    }

    let detected = DeviceLayout::detect(&Getprop::new());
    debug!("detected device: {:?}", detected);

    DeviceLayout::new(
        args.sdk.unwrap_or(detected.sdk_int),
        args.isa.unwrap_or(detected.isa),
    )
}
