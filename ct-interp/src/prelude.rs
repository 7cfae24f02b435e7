//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{DistVolume, Geometry, LabelVolume, VolumeError, VolumeGeometry};

pub use crate::interp::{
    interpolate, InterpConfig, InterpError, InterpResult, Interpolator,
};

pub use crate::consts::gray::{BACKGROUND, FOREGROUND};
pub use crate::consts::{FOREGROUND_TOLERANCE, OUTSIDE_DISTANCE};
