// Copyright 2025 the Quiver Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped acquisition of shared device state.

use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::Device;

/// A buffering window that is only opened if none is active.
///
/// On drop the window is closed if this scope opened it, and the device is
/// flushed if no buffering remains. A caller that already holds a buffer
/// therefore keeps control of when drawing is flushed.
pub struct BufferScope<'a, D: Device + ?Sized> {
    device: &'a mut D,
    opened: bool,
}

impl<'a, D: Device + ?Sized> BufferScope<'a, D> {
    /// Enters a buffering scope on `device`.
    pub fn open(device: &'a mut D) -> Self {
        let opened = !device.is_buffering();
        if opened {
            device.begin_buffer();
        }
        Self { device, opened }
    }

    /// Returns whether this scope opened the buffering window.
    #[must_use]
    pub fn opened(&self) -> bool {
        self.opened
    }
}

impl<D: Device + ?Sized> Deref for BufferScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: Device + ?Sized> DerefMut for BufferScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: Device + ?Sized> Drop for BufferScope<'_, D> {
    fn drop(&mut self) {
        if self.opened {
            self.device.end_buffer();
        }
        if !self.device.is_buffering() {
            self.device.flush();
        }
    }
}

impl<D: Device + ?Sized> fmt::Debug for BufferScope<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferScope")
            .field("opened", &self.opened)
            .finish_non_exhaustive()
    }
}

/// Saves the transform state and character height; restores both on drop.
pub struct StateScope<'a, D: Device + ?Sized> {
    device: &'a mut D,
    character_height: f64,
}

impl<'a, D: Device + ?Sized> StateScope<'a, D> {
    /// Enters a state scope on `device`.
    pub fn save(device: &'a mut D) -> Self {
        let character_height = device.character_height();
        device.save();
        Self {
            device,
            character_height,
        }
    }

    /// The character height that will be restored.
    #[must_use]
    pub fn saved_character_height(&self) -> f64 {
        self.character_height
    }
}

impl<D: Device + ?Sized> Deref for StateScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: Device + ?Sized> DerefMut for StateScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: Device + ?Sized> Drop for StateScope<'_, D> {
    fn drop(&mut self) {
        self.device.restore();
        self.device.set_character_height(self.character_height);
    }
}

impl<D: Device + ?Sized> fmt::Debug for StateScope<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateScope")
            .field("character_height", &self.character_height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordingDevice, TransformSpace};

    #[test]
    fn outermost_scope_opens_closes_and_flushes() {
        let mut device = RecordingDevice::new();
        {
            let scope = BufferScope::open(&mut device);
            assert!(scope.opened());
            assert!(scope.is_buffering());
        }
        assert!(!device.is_buffering());
        let counts = device.buffer_counts();
        assert_eq!((counts.begins, counts.ends, counts.flushes), (1, 1, 1));
    }

    #[test]
    fn nested_scope_leaves_outer_buffer_open() {
        let mut device = RecordingDevice::new();
        device.begin_buffer();
        {
            let scope = BufferScope::open(&mut device);
            assert!(!scope.opened());
        }
        assert!(device.is_buffering());
        let counts = device.buffer_counts();
        assert_eq!((counts.begins, counts.ends, counts.flushes), (1, 0, 0));
    }

    #[test]
    fn state_scope_restores_space_and_height() {
        let mut device = RecordingDevice::new();
        device.set_character_height(1.5);
        {
            let mut scope = StateScope::save(&mut device);
            scope.set_transform_space(TransformSpace::Identity);
            scope.set_character_height(0.25);
        }
        assert_eq!(device.transform_space(), TransformSpace::World);
        assert_eq!(device.character_height().to_bits(), 1.5_f64.to_bits());
    }
}
