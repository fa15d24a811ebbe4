use std::path::Path;

use graticule::config::Settings;
use graticule::export::write_geojson;
use graticule::geo::{normalize_lon, LatLon, EARTH_RADIUS};
use graticule::grid::{
    AngleFormat, Color, DrawContext, GarsGrid, GraticuleLayer, GridSystem, LatLonGrid, MgrsGrid, UpsGrid, UtmGrid,
};
use graticule::shapes::{RenderableHandle, ShapeKind, ShapeStore};
use graticule::view::{Camera, FlatTerrain, Globe};
use tracing::info;

const MIN_ALTITUDE: f64 = 50.0;
const MAX_ALTITUDE: f64 = 30_000_000.0;
const MAX_TILT: f64 = 75.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemKind {
    LatLon,
    Gars,
    Utm,
    Ups,
    Mgrs,
}

impl SystemKind {
    /// Number key that selects this system.
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::LatLon),
            '2' => Some(Self::Gars),
            '3' => Some(Self::Utm),
            '4' => Some(Self::Ups),
            '5' => Some(Self::Mgrs),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "latlon" | "lat-lon" => Some(Self::LatLon),
            "gars" => Some(Self::Gars),
            "utm" => Some(Self::Utm),
            "ups" => Some(Self::Ups),
            "mgrs" => Some(Self::Mgrs),
            _ => None,
        }
    }
}

/// The grid layer currently shown.
pub enum ActiveLayer {
    LatLon(GraticuleLayer<LatLonGrid>),
    Gars(GraticuleLayer<GarsGrid>),
    Utm(GraticuleLayer<UtmGrid>),
    Ups(GraticuleLayer<UpsGrid>),
    Mgrs(GraticuleLayer<MgrsGrid>),
}

macro_rules! with_layer {
    ($layer:expr, $l:ident => $body:expr) => {
        match $layer {
            ActiveLayer::LatLon($l) => $body,
            ActiveLayer::Gars($l) => $body,
            ActiveLayer::Utm($l) => $body,
            ActiveLayer::Ups($l) => $body,
            ActiveLayer::Mgrs($l) => $body,
        }
    };
}

fn configure<S: GridSystem>(system: S, settings: &Settings) -> graticule::Result<GraticuleLayer<S>> {
    let mut layer = GraticuleLayer::with_config(system, settings.graticule.clone())?;
    layer.apply_styles(settings.all_styles.clone(), &settings.styles);
    Ok(layer)
}

impl ActiveLayer {
    pub fn build(kind: SystemKind, settings: &Settings) -> graticule::Result<Self> {
        Ok(match kind {
            SystemKind::LatLon => Self::LatLon(configure(LatLonGrid, settings)?),
            SystemKind::Gars => Self::Gars(configure(GarsGrid, settings)?),
            SystemKind::Utm => Self::Utm(configure(UtmGrid, settings)?),
            SystemKind::Ups => Self::Ups(configure(UpsGrid, settings)?),
            SystemKind::Mgrs => Self::Mgrs(configure(MgrsGrid, settings)?),
        })
    }

    pub fn name(&self) -> &'static str {
        with_layer!(self, l => l.name())
    }
}

/// Application state
pub struct App {
    pub settings: Settings,
    pub camera: Camera,
    pub globe: Globe,
    terrain: FlatTerrain,
    pub store: ShapeStore,
    pub layer: ActiveLayer,
    pub system: SystemKind,
    pub angle_format: AngleFormat,
    /// Handles drawn this frame with the color they are drawn in
    pub drawn: Vec<(RenderableHandle, Color)>,
    pub coastlines: Vec<Vec<LatLon>>,
    pub show_coastlines: bool,
    pub frame_id: u64,
    pub rebuilds: u64,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
}

impl App {
    pub fn new(settings: Settings, system: SystemKind) -> graticule::Result<Self> {
        let layer = ActiveLayer::build(system, &settings)?;
        Ok(Self {
            camera: settings.camera,
            globe: Globe::default(),
            terrain: FlatTerrain::default(),
            store: ShapeStore::new(),
            layer,
            system,
            angle_format: settings.graticule.angle_format,
            drawn: Vec::new(),
            coastlines: Vec::new(),
            show_coastlines: true,
            frame_id: 0,
            rebuilds: 0,
            should_quit: false,
            last_mouse: None,
            settings,
        })
    }

    /// Size the camera to the map area of a `width × height` terminal.
    pub fn resize(&mut self, width: usize, height: usize) {
        // Border (2 columns, 2 rows) plus the status bar; braille is 2×4 per cell
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.camera.set_viewport((inner_width * 2) as f64, (inner_height * 4) as f64);
    }

    /// Run a layer pass for the current camera.
    pub fn update(&mut self) -> bool {
        self.frame_id += 1;
        let dc = DrawContext {
            frame_id: self.frame_id,
            camera: &self.camera,
            globe: &self.globe,
            elevation: &self.terrain,
        };
        let rebuilt = with_layer!(&mut self.layer, l => l.render(&dc, &mut self.store));
        if rebuilt {
            self.rebuilds += 1;
            self.refresh_drawn();
        }
        rebuilt
    }

    fn refresh_drawn(&mut self) {
        self.drawn = with_layer!(&mut self.layer, l => l
            .styled()
            .into_iter()
            .map(|(handle, _, params)| {
                let color = match handle.kind {
                    ShapeKind::Line => params.line_color,
                    ShapeKind::Text => params.label_color,
                };
                (handle, color)
            })
            .collect());
    }

    pub fn switch_system(&mut self, system: SystemKind) -> graticule::Result<()> {
        if system == self.system {
            return Ok(());
        }
        with_layer!(&mut self.layer, l => l.release(&mut self.store));
        self.layer = ActiveLayer::build(system, &self.settings)?;
        self.system = system;
        self.drawn.clear();
        info!(system = self.layer.name(), "switched grid system");
        Ok(())
    }

    pub fn cycle_angle_format(&mut self) {
        self.angle_format = self.angle_format.next();
        self.settings.graticule.angle_format = self.angle_format;
        let format = self.angle_format;
        with_layer!(&mut self.layer, l => l.set_angle_format(format));
    }

    pub fn export(&self, path: &Path) -> graticule::Result<usize> {
        let count = with_layer!(&self.layer, l => write_geojson(l, &self.store, path))?;
        info!(path = %path.display(), features = count, "exported graticule");
        Ok(count)
    }

    /// Meters covered by one pixel at nadir.
    fn meters_per_pixel(&self) -> f64 {
        let half = (self.camera.fov.to_radians() / 2.0).tan();
        2.0 * self.camera.altitude * half / self.camera.viewport_width
    }

    /// Move the camera by a screen offset in pixels.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = (self.meters_per_pixel() / EARTH_RADIUS).to_degrees();
        let (sin_h, cos_h) = self.camera.heading.to_radians().sin_cos();
        let (dx, dy) = (dx as f64 * scale, dy as f64 * scale);
        let north = -dx * sin_h - dy * cos_h;
        let east = dx * cos_h - dy * sin_h;
        self.camera.lat = (self.camera.lat + north).clamp(-89.9, 89.9);
        let cos_lat = self.camera.lat.to_radians().cos().max(0.01);
        self.camera.lon = normalize_lon(self.camera.lon + east / cos_lat);
    }

    pub fn zoom_in(&mut self) {
        self.camera.altitude = (self.camera.altitude * 0.8).max(MIN_ALTITUDE);
    }

    pub fn zoom_out(&mut self) {
        self.camera.altitude = (self.camera.altitude * 1.25).min(MAX_ALTITUDE);
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.camera.heading = (self.camera.heading + degrees).rem_euclid(360.0);
    }

    pub fn tilt(&mut self, degrees: f64) {
        self.camera.tilt = (self.camera.tilt + degrees).clamp(0.0, MAX_TILT);
    }

    /// Back to the configured camera, keeping the viewport.
    pub fn reset_view(&mut self) {
        let (w, h) = (self.camera.viewport_width, self.camera.viewport_height);
        self.camera = self.settings.camera;
        self.camera.set_viewport(w, h);
    }

    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            // One terminal cell is 2×4 braille pixels
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn altitude_text(&self) -> String {
        let alt = self.camera.altitude;
        if alt >= 10_000.0 {
            format!("{:.0} km", alt / 1000.0)
        } else {
            format!("{alt:.0} m")
        }
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.3}°{}, {:.3}°{}",
            self.camera.lat.abs(),
            if self.camera.lat >= 0.0 { "N" } else { "S" },
            self.camera.lon.abs(),
            if self.camera.lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(system: SystemKind) -> App {
        let mut settings = Settings::default();
        settings.camera = Camera { lat: 45.0, lon: 3.0, altitude: 300_000.0, ..Camera::default() };
        App::new(settings, system).unwrap()
    }

    #[test]
    fn update_rebuilds_only_on_change() {
        let mut app = app(SystemKind::LatLon);
        assert!(app.update());
        assert!(!app.drawn.is_empty());
        assert!(!app.update());
        app.zoom_in();
        app.zoom_in();
        assert!(app.update());
        assert_eq!(app.rebuilds, 2);
    }

    #[test]
    fn switching_releases_the_old_layer() {
        let mut app = app(SystemKind::Utm);
        app.update();
        assert!(!app.store.is_empty());
        app.switch_system(SystemKind::Gars).unwrap();
        assert!(app.store.is_empty());
        assert_eq!(app.layer.name(), "GARS");
        assert!(app.update());
    }

    #[test]
    fn pan_follows_heading() {
        let mut app = app(SystemKind::LatLon);
        app.pan(0, -100);
        assert!(app.camera.lat > 45.0);
        assert!((app.camera.lon - 3.0).abs() < 1e-9);

        let mut app = self::app(SystemKind::LatLon);
        app.rotate(90.0);
        app.pan(0, -100);
        assert!(app.camera.lon > 3.0);
        assert!((app.camera.lat - 45.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_and_tilt_are_clamped() {
        let mut app = app(SystemKind::LatLon);
        for _ in 0..200 {
            app.zoom_in();
            app.tilt(10.0);
        }
        assert_eq!(app.camera.altitude, MIN_ALTITUDE);
        assert_eq!(app.camera.tilt, MAX_TILT);
        for _ in 0..200 {
            app.zoom_out();
        }
        assert_eq!(app.camera.altitude, MAX_ALTITUDE);
    }

    #[test]
    fn system_keys() {
        assert_eq!(SystemKind::from_key('3'), Some(SystemKind::Utm));
        assert_eq!(SystemKind::from_key('9'), None);
        assert_eq!(SystemKind::from_name("MGRS"), Some(SystemKind::Mgrs));
    }
}
