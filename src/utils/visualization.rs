//! Plotting of routes and obstacles using gnuplot
//!
//! The ship frame is y-up, so routes are drawn as a top-down projection
//! onto the x-z plane. Layers are collected first and rendered into a
//! single set of axes when the figure is shown or saved.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Aabb, ObstacleSet, Path3D, Point3D};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = GRAY;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const RAW_PATH: &str = ORANGE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Route")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, z: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, z: Vec<f64>, style: PointStyle },
}

/// Top-down route plotter
pub struct Visualizer {
    title: String,
    x_label: String,
    z_label: String,
    x_range: Option<(f64, f64)>,
    z_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
    layers: Vec<Layer>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            x_label: "X [m]".to_string(),
            z_label: "Z [m]".to_string(),
            x_range: None,
            z_range: None,
            aspect_ratio: Some(1.0),
            layers: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_z_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.z_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Number of layers queued for rendering
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_path(&mut self, path: &Path3D, style: &PathStyle) -> &mut Self {
        if path.is_empty() {
            return self;
        }
        self.layers.push(Layer::Lines {
            x: path.x_coords(),
            z: path.z_coords(),
            style: style.clone(),
        });
        self
    }

    /// Footprint of every box as a closed outline
    pub fn plot_obstacles(&mut self, obstacles: &ObstacleSet) -> &mut Self {
        for (n, aabb) in obstacles.iter().enumerate() {
            let (x, z) = footprint(aabb);
            // Caption only the first outline so the legend has one entry
            let caption = if n == 0 { "Obstacles" } else { "" };
            self.layers.push(Layer::Lines {
                x,
                z,
                style: PathStyle::new(colors::OBSTACLE, caption).with_line_width(1.0),
            });
        }
        self
    }

    pub fn plot_point(&mut self, point: Point3D, style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![point.x],
            z: vec![point.z],
            style: style.clone(),
        });
        self
    }

    pub fn plot_start(&mut self, point: Point3D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_goal(&mut self, point: Point3D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> Result<(), String> {
        let mut figure = self.render();
        figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        let mut figure = self.render();
        figure.save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    pub fn save_svg(&mut self, path: &str) -> Result<(), String> {
        let mut figure = self.render();
        figure.save_to_svg(path, 800, 600).map_err(|e| e.to_string())
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.z_label, &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.z_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, z, style } => {
                    axes.lines(x, z, &[Caption(&style.caption), Color(&style.color), LineWidth(style.line_width)]);
                }
                Layer::Points { x, z, style } => {
                    axes.points(
                        x,
                        z,
                        &[
                            Caption(&style.caption),
                            Color(&style.color),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ],
                    );
                }
            }
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

fn footprint(aabb: &Aabb) -> (Vec<f64>, Vec<f64>) {
    let (x0, x1, z0, z1) = (aabb.min.x, aabb.max.x, aabb.min.z, aabb.max.z);
    (vec![x0, x1, x1, x0, x0], vec![z0, z0, z1, z1, z0])
}
