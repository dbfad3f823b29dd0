//! Display projection of an N-dimensional dataset onto a 2D ARGB raster.
//!
//! Axes 0 and 1 are the displayed plane (x, y). Every other axis is pinned to
//! the view's current position, which the host moves with
//! [`DatasetView::set_position`]. [`DatasetView::project`] then rescans the whole
//! plane and overwrites the raster.
//!
//! The projection strategy is fixed when the view is built:
//!
//! | Mode            | Pixel source                                         |
//! |-----------------|------------------------------------------------------|
//! | `none`          | gray level of the current plane                      |
//! | `single-lut`    | one color table applied to the current plane         |
//! | `composite`     | every channel through its own table, blended         |
//! | `per-plane-lut` | current channel through that channel's table         |
//!
//! Views are not internally synchronized. Serialize `set_position`/`project`
//! pairs per view, and do not read the raster while a projection is running.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::color_table::ColorTable;
use crate::convert::{ChannelConverter, DisplayRange, composite};
use crate::dataset::Dataset;
use crate::error::{PlaneviewError, Result};
use crate::raster::ArgbRaster;

/// A dataset shared between the host and the views displaying it.
pub type SharedDataset = Arc<RwLock<Dataset>>;

/// Something that shows a view's raster and must redraw when it changes.
pub trait ImageCanvas: Send + Sync {
    fn update_image(&self);
}

/// How channels are turned into display colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionMode {
    /// Gray levels, no color table.
    #[default]
    #[serde(rename = "none")]
    Direct,
    /// One color table for whatever plane is shown.
    SingleLut,
    /// All channels blended, one color table each.
    Composite,
    /// One channel at a time, each with its own color table.
    PerPlaneLut,
}

/// Display options, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub mode: ProjectionMode,
    /// Sample values mapped to display indices 0 and 255.
    #[serde(default)]
    pub range: DisplayRange,
    /// Channel axis override. Defaults to the dataset's `Channel` axis.
    #[serde(default)]
    pub channel_axis: Option<usize>,
}

impl DisplaySettings {
    pub fn new(mode: ProjectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone)]
enum Projector {
    Direct(ChannelConverter),
    SingleLut(ChannelConverter),
    Composite(Vec<ChannelConverter>),
    PerPlaneLut {
        converter: ChannelConverter,
        tables: Vec<ColorTable>,
    },
}

/// A live 2D view into a dataset.
pub struct DatasetView {
    name: String,
    dataset: SharedDataset,
    mode: ProjectionMode,
    channel_axis: Option<usize>,
    projector: Projector,
    position: Vec<i64>,
    raster: ArgbRaster,
    canvas: Option<Arc<dyn ImageCanvas>>,
    position_x: i32,
    position_y: i32,
}

impl DatasetView {
    /// Build a view and project it once.
    ///
    /// `tables` supplies the color tables the mode needs: none for `none`, at
    /// least one for `single-lut` (the first is used), and exactly one per
    /// channel for `composite` and `per-plane-lut`.
    pub fn new(
        name: impl Into<String>,
        dataset: SharedDataset,
        settings: &DisplaySettings,
        tables: Vec<ColorTable>,
    ) -> Result<Self> {
        let (dims, labelled_channel) = {
            let ds = dataset.read();
            (ds.dims().to_vec(), ds.channel_axis())
        };
        if dims.len() < 2 {
            return Err(PlaneviewError::NotPlanar(dims.len()));
        }
        let (width, height) = plane_size(&dims)?;

        let channel_axis = settings.channel_axis.or(labelled_channel);
        if let Some(axis) = channel_axis {
            if axis < 2 || axis >= dims.len() {
                return Err(PlaneviewError::InvalidAxis {
                    axis,
                    reason: "channel axis must be a non-spatial axis of the image",
                });
            }
        }

        let range = settings.range;
        let projector = match settings.mode {
            ProjectionMode::Direct => Projector::Direct(ChannelConverter::gray(range)),
            ProjectionMode::SingleLut => {
                let table = tables
                    .into_iter()
                    .next()
                    .ok_or(PlaneviewError::ColorTableCount {
                        expected: 1,
                        actual: 0,
                    })?;
                Projector::SingleLut(ChannelConverter::lut(range, table))
            }
            ProjectionMode::Composite => {
                let axis = channel_axis.ok_or(PlaneviewError::MissingChannelAxis)?;
                check_table_count(&tables, dims[axis])?;
                Projector::Composite(
                    tables
                        .into_iter()
                        .map(|table| ChannelConverter::lut(range, table))
                        .collect(),
                )
            }
            ProjectionMode::PerPlaneLut => {
                let axis = channel_axis.ok_or(PlaneviewError::MissingChannelAxis)?;
                check_table_count(&tables, dims[axis])?;
                let converter = ChannelConverter::lut(range, tables[0].clone());
                Projector::PerPlaneLut { converter, tables }
            }
        };

        let mut view = Self {
            name: name.into(),
            dataset,
            mode: settings.mode,
            channel_axis,
            projector,
            position: vec![0; dims.len()],
            raster: ArgbRaster::new(width, height),
            canvas: None,
            position_x: 0,
            position_y: 0,
        };
        view.project();
        Ok(view)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dataset(&self) -> &SharedDataset {
        &self.dataset
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn channel_axis(&self) -> Option<usize> {
        self.channel_axis
    }

    pub fn raster(&self) -> &ArgbRaster {
        &self.raster
    }

    /// Converters in use: one per channel in composite mode, otherwise one.
    pub fn converters(&self) -> &[ChannelConverter] {
        match &self.projector {
            Projector::Direct(c) | Projector::SingleLut(c) => std::slice::from_ref(c),
            Projector::PerPlaneLut { converter, .. } => std::slice::from_ref(converter),
            Projector::Composite(converters) => converters,
        }
    }

    /// Color table used for the plane currently shown, if the mode uses one.
    ///
    /// In composite mode this is the table of the channel at the current position.
    pub fn active_table(&self) -> Option<&ColorTable> {
        match &self.projector {
            Projector::Direct(_) => None,
            Projector::SingleLut(c) | Projector::PerPlaneLut { converter: c, .. } => c.table(),
            Projector::Composite(converters) => {
                let channel = self.channel_axis.map_or(0, |axis| self.position[axis]);
                converters.get(channel as usize).and_then(ChannelConverter::table)
            }
        }
    }

    pub fn set_canvas(&mut self, canvas: Arc<dyn ImageCanvas>) {
        self.canvas = Some(canvas);
    }

    pub fn clear_canvas(&mut self) {
        self.canvas = None;
    }

    /// Current position on `axis`.
    pub fn position(&self, axis: usize) -> Option<i64> {
        self.position.get(axis).copied()
    }

    /// Full position vector. Components 0 and 1 are unused.
    pub fn positions(&self) -> &[i64] {
        &self.position
    }

    /// Horizontal pan offset of the view on its canvas.
    pub fn position_x(&self) -> i32 {
        self.position_x
    }

    pub fn set_position_x(&mut self, position_x: i32) {
        self.position_x = position_x;
    }

    /// Vertical pan offset of the view on its canvas.
    pub fn position_y(&self) -> i32 {
        self.position_y
    }

    pub fn set_position_y(&mut self, position_y: i32) {
        self.position_y = position_y;
    }

    /// Move the view to `value` along the non-spatial `axis`.
    ///
    /// In `per-plane-lut` mode, moving along the channel axis also switches the
    /// active color table to that channel's table. The attached canvas is told
    /// to redraw; the raster itself only changes on the next [`Self::project`].
    pub fn set_position(&mut self, value: i64, axis: usize) -> Result<()> {
        let ndim = self.position.len();
        if axis < 2 || axis >= ndim {
            return Err(PlaneviewError::InvalidAxis {
                axis,
                reason: "position can only be set on a non-spatial axis",
            });
        }
        let size = {
            let ds = self.dataset.read();
            ds.dims().get(axis).copied().unwrap_or(0)
        };
        if value < 0 || value as u64 >= size as u64 {
            return Err(PlaneviewError::PositionOutOfBounds { axis, value, size });
        }

        if self.channel_axis == Some(axis) {
            if let Projector::PerPlaneLut { converter, tables } = &mut self.projector {
                let table = tables
                    .get(value as usize)
                    .ok_or(PlaneviewError::ColorTableCount {
                        expected: size,
                        actual: tables.len(),
                    })?;
                converter.set_table(table.clone());
            }
        }
        self.position[axis] = value;
        tracing::debug!("view {:?}: axis {axis} -> {value}", self.name);

        if let Some(canvas) = &self.canvas {
            canvas.update_image();
        }
        Ok(())
    }

    /// Recompute every raster pixel from the dataset at the current position.
    pub fn project(&mut self) {
        if !self.sync_geometry() {
            tracing::warn!(
                "view {:?}: dataset shape no longer fits the view, nothing projected",
                self.name
            );
            return;
        }

        let dataset = self.dataset.read();
        let image = dataset.image();
        let (width, height) = (self.raster.width(), self.raster.height());
        let mut pos = self.position.clone();

        match &self.projector {
            Projector::Direct(converter)
            | Projector::SingleLut(converter)
            | Projector::PerPlaneLut { converter, .. } => {
                for y in 0..height {
                    pos[1] = y as i64;
                    for x in 0..width {
                        pos[0] = x as i64;
                        self.raster.set(x, y, converter.convert(image.get(&pos)));
                    }
                }
            }
            Projector::Composite(converters) => {
                // Composite views always have a channel axis.
                let axis = self.channel_axis.unwrap_or(2);
                let channels = converters.len().min(image.dim(axis));
                let mut samples = vec![0.0; channels];
                for y in 0..height {
                    pos[1] = y as i64;
                    for x in 0..width {
                        pos[0] = x as i64;
                        for (c, sample) in samples.iter_mut().enumerate() {
                            pos[axis] = c as i64;
                            *sample = image.get(&pos);
                        }
                        self.raster.set(x, y, composite(converters, &samples));
                    }
                }
            }
        }

        tracing::debug!(
            "view {:?} projected {}x{} ({:?}) at {:?}",
            self.name,
            width,
            height,
            self.mode,
            self.position.get(2..).unwrap_or_default()
        );
    }

    fn channel_position(&self) -> Option<i64> {
        self.channel_axis
            .and_then(|axis| self.position.get(axis).copied())
    }

    /// Follow shape changes of the shared dataset: resize the raster and keep
    /// the position vector inside the image. Returns `false` if the dataset
    /// cannot be displayed as a plane any more, or lost the channel axis.
    fn sync_geometry(&mut self) -> bool {
        let dims = self.dataset.read().dims().to_vec();
        let Ok((width, height)) = plane_size(&dims) else {
            return false;
        };
        if self.channel_axis.is_some_and(|axis| axis >= dims.len()) {
            return false;
        }
        let previous_channel = self.channel_position();
        if dims.len() != self.position.len() {
            self.position.resize(dims.len(), 0);
        }
        for (p, &size) in self.position.iter_mut().zip(&dims).skip(2) {
            *p = (*p).clamp(0, size as i64 - 1);
        }
        let channel = self.channel_position();
        if channel != previous_channel {
            // The shown channel moved, so its table must follow.
            if let (Projector::PerPlaneLut { converter, tables }, Some(channel)) =
                (&mut self.projector, channel)
            {
                if let Some(table) = tables.get(channel as usize) {
                    converter.set_table(table.clone());
                }
            }
        }
        if width != self.raster.width() || height != self.raster.height() {
            self.raster = ArgbRaster::new(width, height);
        }
        true
    }
}

impl fmt::Debug for DatasetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetView")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("channel_axis", &self.channel_axis)
            .field("position", &self.position)
            .field("raster", &(self.raster.width(), self.raster.height()))
            .field("has_canvas", &self.canvas.is_some())
            .finish_non_exhaustive()
    }
}

fn plane_size(dims: &[usize]) -> Result<(u32, u32)> {
    match (dims.first(), dims.get(1)) {
        (Some(&w), Some(&h)) => {
            let width = u32::try_from(w).map_err(|_| PlaneviewError::TooLarge(dims.to_vec()))?;
            let height = u32::try_from(h).map_err(|_| PlaneviewError::TooLarge(dims.to_vec()))?;
            Ok((width, height))
        }
        _ => Err(PlaneviewError::NotPlanar(dims.len())),
    }
}

fn check_table_count(tables: &[ColorTable], channels: usize) -> Result<()> {
    if tables.len() == channels {
        Ok(())
    } else {
        Err(PlaneviewError::ColorTableCount {
            expected: channels,
            actual: tables.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::pack_argb;
    use crate::image::Image;
    use crate::sample::SampleKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCanvas {
        redraws: AtomicUsize,
    }

    impl ImageCanvas for CountingCanvas {
        fn update_image(&self) {
            self.redraws.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 4×4×2 image: channel 0 holds `x * 16`, channel 1 holds `y * 16 + 100`.
    fn two_channel() -> SharedDataset {
        let mut image = Image::new(&[4, 4, 2], SampleKind::U8).expect("valid image");
        for y in 0..4 {
            for x in 0..4 {
                image.set(&[x, y, 0], (x * 16) as f64);
                image.set(&[x, y, 1], (y * 16 + 100) as f64);
            }
        }
        Arc::new(RwLock::new(Dataset::with_default_axes("two", image)))
    }

    #[test]
    fn test_direct_mode_is_gray() {
        let image = Image::from_values(&[2, 1], SampleKind::U8, &[0.0, 200.0]).expect("valid image");
        let ds = Arc::new(RwLock::new(Dataset::with_default_axes("plane", image)));
        let view = DatasetView::new("v", ds, &DisplaySettings::default(), Vec::new())
            .expect("valid view");
        assert_eq!(view.raster().pixels(), &[0xff00_0000, 0xffc8_c8c8]);
        assert!(view.active_table().is_none());
    }

    #[test]
    fn test_single_lut_follows_plane_position() {
        let view_settings = DisplaySettings::new(ProjectionMode::SingleLut);
        let mut view = DatasetView::new("v", two_channel(), &view_settings, vec![ColorTable::red()])
            .expect("valid view");
        assert_eq!(view.raster().get(3, 0), pack_argb(0xff, 48, 0, 0));

        view.set_position(1, 2).expect("valid position");
        // Not re-projected yet.
        assert_eq!(view.raster().get(3, 0), pack_argb(0xff, 48, 0, 0));
        view.project();
        assert_eq!(view.raster().get(3, 2), pack_argb(0xff, 132, 0, 0));
        assert_eq!(view.active_table(), Some(&ColorTable::red()));
    }

    #[test]
    fn test_composite_blends_all_channels() {
        let settings = DisplaySettings::new(ProjectionMode::Composite);
        let view = DatasetView::new(
            "v",
            two_channel(),
            &settings,
            vec![ColorTable::red(), ColorTable::green()],
        )
        .expect("valid view");
        for y in 0..4u32 {
            for x in 0..4u32 {
                let expected = pack_argb(0xff, (x * 16) as u8, (y * 16 + 100) as u8, 0);
                assert_eq!(view.raster().get(x, y), expected, "pixel ({x}, {y})");
            }
        }
        assert_eq!(view.converters().len(), 2);
    }

    #[test]
    fn test_per_plane_switches_table_on_channel_move() {
        let settings = DisplaySettings::new(ProjectionMode::PerPlaneLut);
        let mut view = DatasetView::new(
            "v",
            two_channel(),
            &settings,
            vec![ColorTable::red(), ColorTable::blue()],
        )
        .expect("valid view");
        assert_eq!(view.active_table(), Some(&ColorTable::red()));

        view.set_position(1, 2).expect("valid position");
        assert_eq!(view.active_table(), Some(&ColorTable::blue()));
        view.project();
        assert_eq!(view.raster().get(0, 3), pack_argb(0xff, 0, 0, 148));
    }

    #[test]
    fn test_mode_requirements() {
        let settings = DisplaySettings::new(ProjectionMode::Composite);
        let err = DatasetView::new("v", two_channel(), &settings, vec![ColorTable::red()])
            .unwrap_err();
        assert!(matches!(err, PlaneviewError::ColorTableCount { expected: 2, actual: 1 }));

        let err = DatasetView::new(
            "v",
            two_channel(),
            &DisplaySettings::new(ProjectionMode::SingleLut),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, PlaneviewError::ColorTableCount { expected: 1, actual: 0 }));

        let plane = Image::new(&[2, 2], SampleKind::U8).expect("valid image");
        let ds = Arc::new(RwLock::new(Dataset::with_default_axes("plane", plane)));
        let err = DatasetView::new("v", ds, &settings, vec![ColorTable::red()]).unwrap_err();
        assert!(matches!(err, PlaneviewError::MissingChannelAxis));

        let line = Image::new(&[4], SampleKind::U8).expect("valid image");
        let ds = Arc::new(RwLock::new(Dataset::with_default_axes("line", line)));
        let err = DatasetView::new("v", ds, &DisplaySettings::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, PlaneviewError::NotPlanar(1)));

        let mut bad_axis = DisplaySettings::new(ProjectionMode::Composite);
        bad_axis.channel_axis = Some(0);
        let err = DatasetView::new("v", two_channel(), &bad_axis, Vec::new()).unwrap_err();
        assert!(matches!(err, PlaneviewError::InvalidAxis { axis: 0, .. }));
    }

    #[test]
    fn test_set_position_validation_and_canvas() {
        let mut view =
            DatasetView::new("v", two_channel(), &DisplaySettings::default(), Vec::new())
                .expect("valid view");
        let canvas = Arc::new(CountingCanvas::default());
        view.set_canvas(canvas.clone());

        assert!(matches!(
            view.set_position(0, 1),
            Err(PlaneviewError::InvalidAxis { axis: 1, .. })
        ));
        assert!(matches!(
            view.set_position(2, 2),
            Err(PlaneviewError::PositionOutOfBounds { axis: 2, value: 2, size: 2 })
        ));
        assert!(matches!(
            view.set_position(0, 3),
            Err(PlaneviewError::InvalidAxis { axis: 3, .. })
        ));
        assert_eq!(canvas.redraws.load(Ordering::SeqCst), 0);

        view.set_position(1, 2).expect("valid position");
        assert_eq!(view.position(2), Some(1));
        assert_eq!(canvas.redraws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_project_sees_shared_dataset_changes() {
        let ds = two_channel();
        let mut view = DatasetView::new("v", ds.clone(), &DisplaySettings::default(), Vec::new())
            .expect("valid view");
        assert_eq!(view.raster().get(0, 0), 0xff00_0000);

        {
            let mut guard = ds.write();
            guard.image_mut().set(&[0, 0, 0], 255.0);
            guard.update();
        }
        view.project();
        assert_eq!(view.raster().get(0, 0), 0xffff_ffff);
    }

    #[test]
    fn test_project_skips_dataset_that_lost_channel_axis() {
        let ds = two_channel();
        let mut view = DatasetView::new(
            "v",
            ds.clone(),
            &DisplaySettings::new(ProjectionMode::Composite),
            vec![ColorTable::red(), ColorTable::green()],
        )
        .expect("valid view");
        let before = view.raster().clone();

        let plane = Image::filled(&[4, 4], SampleKind::U8, 10.0).expect("valid image");
        *ds.write() = Dataset::with_default_axes("two", plane);
        view.project();
        assert_eq!(view.raster(), &before);
        assert_eq!(view.positions().len(), 3);
    }

    #[test]
    fn test_per_plane_table_follows_clamped_channel() {
        let image = Image::filled(&[2, 1, 3], SampleKind::U8, 200.0).expect("valid image");
        let ds = Arc::new(RwLock::new(Dataset::with_default_axes("rgb", image)));
        let mut view = DatasetView::new(
            "v",
            ds.clone(),
            &DisplaySettings::new(ProjectionMode::PerPlaneLut),
            vec![ColorTable::red(), ColorTable::green(), ColorTable::blue()],
        )
        .expect("valid view");
        view.set_position(2, 2).expect("valid position");
        view.project();
        assert_eq!(view.raster().get(0, 0), pack_argb(0xff, 0, 0, 200));

        let fewer = Image::filled(&[2, 1, 2], SampleKind::U8, 200.0).expect("valid image");
        *ds.write() = Dataset::with_default_axes("rg", fewer);
        view.project();
        assert_eq!(view.position(2), Some(1));
        assert_eq!(view.active_table(), Some(&ColorTable::green()));
        assert_eq!(view.raster().get(1, 0), pack_argb(0xff, 0, 200, 0));
    }

    #[test]
    fn test_settings_from_json() {
        let settings =
            DisplaySettings::from_json(r#"{"mode": "per-plane-lut", "range": {"min": 0, "max": 4095}}"#)
                .expect("valid json");
        assert_eq!(settings.mode, ProjectionMode::PerPlaneLut);
        assert_eq!(settings.range, DisplayRange::new(0.0, 4095.0));
        assert_eq!(settings.channel_axis, None);

        let settings = DisplaySettings::from_json(r#"{"mode": "none"}"#).expect("valid json");
        assert_eq!(settings.mode, ProjectionMode::Direct);
        assert_eq!(settings.range, DisplayRange::default());
    }
}
