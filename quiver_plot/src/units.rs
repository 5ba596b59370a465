// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unit systems for reporting text extents.

use kurbo::{Size, Vec2};
use quiver_device::{Device, TransformSpace};

use crate::UnitsError;

/// The unit system a device-space measurement is converted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Units {
    /// Fractions of the surface width and height.
    Normalized,
    /// Inches.
    Inches,
    /// Millimetres.
    Millimeters,
    /// Output pixels.
    Pixels,
    /// World (user data) coordinates, as signed distances.
    World,
    /// Raw device units.
    Device,
}

impl Units {
    /// The legacy integer selector for these units.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Normalized => 0,
            Self::Inches => 1,
            Self::Millimeters => 2,
            Self::Pixels => 3,
            Self::World => 4,
            Self::Device => 5,
        }
    }

    /// Converts a device-space size into these units.
    ///
    /// `World` switches the device to world space and maps the size as a
    /// displacement, so translation does not apply. A world axis that is
    /// flipped relative to the device yields a negative component.
    pub fn convert<D: Device + ?Sized>(self, device: &mut D, raw: Size) -> Size {
        let info = device.info();
        match self {
            Self::Normalized => Size::new(raw.width / info.width, raw.height / info.height),
            Self::Pixels => Size::new(
                raw.width * info.units_per_pixel,
                raw.height * info.units_per_pixel,
            ),
            Self::Device => raw,
            Self::Millimeters => {
                Size::new(raw.width * info.units_per_mm, raw.height * info.units_per_mm)
            }
            Self::Inches => Size::new(
                raw.width * info.units_per_mm / 25.4,
                raw.height * info.units_per_mm / 25.4,
            ),
            Self::World => {
                device.set_transform_space(TransformSpace::World);
                let d = device.device_to_user_distance(Vec2::new(raw.width, raw.height));
                Size::new(d.x, d.y)
            }
        }
    }
}

impl TryFrom<i32> for Units {
    type Error = UnitsError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Normalized,
            1 => Self::Inches,
            2 => Self::Millimeters,
            3 => Self::Pixels,
            4 => Self::World,
            5 => Self::Device,
            _ => return Err(UnitsError(code)),
        })
    }
}

#[cfg(test)]
mod tests {
    use quiver_device::{DeviceInfo, RecordingDevice};

    use super::*;

    #[test]
    fn codes_round_trip() {
        for units in [
            Units::Normalized,
            Units::Inches,
            Units::Millimeters,
            Units::Pixels,
            Units::World,
            Units::Device,
        ] {
            assert_eq!(Units::try_from(units.code()), Ok(units));
        }
        assert_eq!(Units::try_from(6), Err(UnitsError(6)));
        assert_eq!(Units::try_from(-1), Err(UnitsError(-1)));
    }

    #[test]
    fn physical_units_scale_by_device_metadata() {
        let info = DeviceInfo::points(200.0, 100.0)
            .with_units_per_pixel(2.0)
            .with_units_per_mm(4.0);
        let mut device = RecordingDevice::new().with_info(info);
        let raw = Size::new(10.0, 5.0);

        assert_eq!(Units::Device.convert(&mut device, raw), raw);
        assert_eq!(Units::Normalized.convert(&mut device, raw), Size::new(0.05, 0.05));
        assert_eq!(Units::Pixels.convert(&mut device, raw), Size::new(20.0, 10.0));
        assert_eq!(Units::Millimeters.convert(&mut device, raw), Size::new(40.0, 20.0));
        let inches = Units::Inches.convert(&mut device, raw);
        assert!((inches.width - 40.0 / 25.4).abs() < 1e-12);
        assert!((inches.height - 20.0 / 25.4).abs() < 1e-12);
    }
}
