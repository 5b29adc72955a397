//! Canvas command model for `POST /draw_canvas`.
//!
//! A draw request is a JSON array of single-key objects, one per shape:
//! `[{"Rectangle": {...}}, {"Text": {...}}]`. That is serde's default
//! externally tagged enum representation, so [`CanvasCommand`] derives it
//! directly. Later entries paint over earlier ones, and the device never
//! clears the screen on its own between requests.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::display::DisplayConfig;
use crate::error::{Result, ScreenError};

/// `(x, y)` in pixels, serialized as `[x, y]`.
pub type Point = (i32, i32);

/// A CSS color string such as `"black"`, `"#00f"` or `"rgb(255,0,0)"`.
///
/// The device does the parsing; the client passes the string through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasCommand {
    Text(Text),
    Image(Image),
    Line(Line),
    Circle(Circle),
    Ellipse(Ellipse),
    Arc(Arc),
    Sector(Sector),
    Rectangle(Rectangle),
    RoundedRectangle(RoundedRectangle),
    Polyline(Polyline),
    Triangle(Triangle),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub x: i32,
    pub y: i32,
    pub text: String,
    /// Font size in pixels. The device takes fractional sizes; this client
    /// only sends whole ones, so batch files with `20.5` fail to parse.
    pub size: u32,
    pub color: Color,
}

impl Text {
    pub fn new(x: i32, y: i32, text: impl Into<String>, size: u32, color: impl Into<Color>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            size,
            color: color.into(),
        }
    }
}

/// A cached upload (`key`) or inline base64-encoded image data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl Image {
    /// Draw an image previously stored with `upload_image?key=...`.
    pub fn cached(x: i32, y: i32, key: impl Into<String>) -> Self {
        Self {
            x,
            y,
            key: Some(key.into()),
            base64: None,
        }
    }

    /// Embed encoded image bytes (PNG, JPEG, GIF) directly in the request.
    pub fn inline(x: i32, y: i32, data: &[u8]) -> Self {
        Self {
            x,
            y,
            key: None,
            base64: Some(base64::engine::general_purpose::STANDARD.encode(data)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub stroke_width: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub top_left: Point,
    pub diameter: u32,
    pub stroke_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ellipse {
    pub top_left: Point,
    pub size: (u32, u32),
    pub stroke_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
}

/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub top_left: Point,
    pub diameter: u32,
    pub stroke_width: u32,
    pub angle_start: f32,
    pub angle_sweep: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub top_left: Point,
    pub diameter: u32,
    pub stroke_width: u32,
    pub angle_start: f32,
    pub angle_sweep: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
}

/// Axis-aligned rectangle. `stroke_width == 0` draws no outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    pub stroke_width: u32,
}

impl Rectangle {
    /// An outline-free, fill-free rectangle; chain [`fill`](Self::fill) and
    /// [`stroke`](Self::stroke) to style it.
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            fill_color: None,
            stroke_color: None,
            stroke_width: 0,
        }
    }

    pub fn fill(mut self, color: impl Into<Color>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn stroke(mut self, color: impl Into<Color>, width: u32) -> Self {
        self.stroke_color = Some(color.into());
        self.stroke_width = width;
        self
    }
}

/// Corner radii are `[horizontal, vertical]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedRectangle {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub stroke_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    pub top_left_corner: (u32, u32),
    pub top_right_corner: (u32, u32),
    pub bottom_right_corner: (u32, u32),
    pub bottom_left_corner: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub stroke_width: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertex1: Point,
    pub vertex2: Point,
    pub vertex3: Point,
    pub stroke_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
}

macro_rules! impl_from_shape {
    ($($shape:ident),* $(,)?) => {
        $(
            impl From<$shape> for CanvasCommand {
                fn from(shape: $shape) -> Self {
                    CanvasCommand::$shape(shape)
                }
            }
        )*
    };
}

impl_from_shape!(
    Text,
    Image,
    Line,
    Circle,
    Ellipse,
    Arc,
    Sector,
    Rectangle,
    RoundedRectangle,
    Polyline,
    Triangle,
);

impl CanvasCommand {
    /// Variant name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Image(_) => "Image",
            Self::Line(_) => "Line",
            Self::Circle(_) => "Circle",
            Self::Ellipse(_) => "Ellipse",
            Self::Arc(_) => "Arc",
            Self::Sector(_) => "Sector",
            Self::Rectangle(_) => "Rectangle",
            Self::RoundedRectangle(_) => "RoundedRectangle",
            Self::Polyline(_) => "Polyline",
            Self::Triangle(_) => "Triangle",
        }
    }

    fn colors(&self) -> Vec<&Color> {
        fn styled<'a>(fill: &'a Option<Color>, stroke: &'a Option<Color>) -> Vec<&'a Color> {
            fill.iter().chain(stroke.iter()).collect()
        }

        match self {
            Self::Text(t) => vec![&t.color],
            Self::Line(l) => vec![&l.color],
            Self::Arc(a) => vec![&a.color],
            Self::Polyline(p) => vec![&p.color],
            Self::Image(_) => vec![],
            Self::Circle(c) => styled(&c.fill_color, &c.stroke_color),
            Self::Ellipse(e) => styled(&e.fill_color, &e.stroke_color),
            Self::Sector(s) => styled(&s.fill_color, &s.stroke_color),
            Self::Rectangle(r) => styled(&r.fill_color, &r.stroke_color),
            Self::RoundedRectangle(r) => styled(&r.fill_color, &r.stroke_color),
            Self::Triangle(t) => styled(&t.fill_color, &t.stroke_color),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.colors().iter().any(|c| c.as_str().trim().is_empty()) {
            return Err("empty color".into());
        }
        match self {
            Self::Image(img) => match (&img.key, &img.base64) {
                (Some(key), None) if !key.is_empty() => Ok(()),
                (None, Some(data)) if !data.is_empty() => Ok(()),
                (Some(_), Some(_)) => Err("image has both `key` and `base64`".into()),
                _ => Err("image needs a non-empty `key` or `base64`".into()),
            },
            Self::Polyline(p) if p.points.len() < 2 => {
                Err(format!("polyline needs at least 2 points, got {}", p.points.len()))
            }
            _ => Ok(()),
        }
    }
}

/// An ordered list of commands sent in one `draw_canvas` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasBatch(Vec<CanvasCommand>);

impl CanvasBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch that starts by painting the whole canvas with an opaque,
    /// unstroked rectangle, wiping whatever the previous batch left behind.
    pub fn cleared(display: &DisplayConfig, color: impl Into<Color>) -> Self {
        let background = Rectangle::new(0, 0, display.rotated_width, display.rotated_height)
            .fill(color);
        Self(vec![background.into()])
    }

    pub fn with(mut self, command: impl Into<CanvasCommand>) -> Self {
        self.push(command);
        self
    }

    pub fn push(&mut self, command: impl Into<CanvasCommand>) {
        self.0.push(command.into());
    }

    pub fn commands(&self) -> &[CanvasCommand] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanvasCommand> {
        self.0.iter()
    }

    /// Check the batch before it goes on the wire.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(ScreenError::InvalidBatch("batch is empty".into()));
        }
        for (index, command) in self.0.iter().enumerate() {
            command.validate().map_err(|reason| {
                ScreenError::InvalidBatch(format!("#{index} {}: {reason}", command.kind()))
            })?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON array of tagged commands, e.g. a batch file on disk.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Vec<CanvasCommand>> for CanvasBatch {
    fn from(commands: Vec<CanvasCommand>) -> Self {
        Self(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rectangle_wire_shape() {
        let cmd: CanvasCommand = Rectangle::new(10, 20, 60, 60).fill("red").stroke("blue", 6).into();
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({
                "Rectangle": {
                    "left": 10,
                    "top": 20,
                    "width": 60,
                    "height": 60,
                    "fill_color": "red",
                    "stroke_color": "blue",
                    "stroke_width": 6
                }
            })
        );
    }

    #[test]
    fn test_unset_colors_are_omitted() {
        let cmd: CanvasCommand = Rectangle::new(80, 20, 60, 60).stroke("blue", 6).into();
        let value = serde_json::to_value(&cmd).unwrap();
        let fields = value["Rectangle"].as_object().unwrap();
        assert!(!fields.contains_key("fill_color"));
        assert_eq!(fields["stroke_width"], 6);
    }

    #[test]
    fn test_text_keeps_multibyte_glyphs() {
        let cmd: CanvasCommand = Text::new(10, 15, "Hello!你好世界！", 20, "white").into();
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("你好世界"));
        let back: CanvasCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_fractional_text_size_rejected() {
        let json = r#"[{"Text": {"x": 0, "y": 0, "text": "hi", "size": 20.5, "color": "white"}}]"#;
        let err = CanvasBatch::from_json(json).unwrap_err();
        assert!(matches!(err, ScreenError::Json(_)), "got: {err:?}");
        assert!(err.to_string().contains("u32"));

        let whole = r#"[{"Text": {"x": 0, "y": 0, "text": "hi", "size": 20, "color": "white"}}]"#;
        assert!(CanvasBatch::from_json(whole).is_ok());
    }

    #[test]
    fn test_batch_json_is_tagged_array() {
        let batch = CanvasBatch::new().with(Text::new(10, 15, "Hello!你好世界！", 20, "white"));
        let json = batch.to_json().unwrap();
        assert!(json.starts_with(r#"[{"Text":{"#));
        assert_eq!(CanvasBatch::from_json(&json).unwrap(), batch);
    }

    #[test]
    fn test_points_serialize_as_arrays() {
        let cmd: CanvasCommand = Line {
            start: (70, 70),
            end: (100, 100),
            stroke_width: 5,
            color: "white".into(),
        }
        .into();
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"Line": {"start": [70, 70], "end": [100, 100], "stroke_width": 5, "color": "white"}})
        );
    }

    #[test]
    fn test_parse_device_example_payload() {
        let json = r##"[
            {"RoundedRectangle": {"left": 30, "top": 70, "width": 30, "height": 30,
                "fill_color": "red", "stroke_color": "blue", "stroke_width": 3,
                "top_left_corner": [15, 15], "top_right_corner": [15, 15],
                "bottom_right_corner": [15, 15], "bottom_left_corner": [15, 15]}},
            {"Circle": {"top_left": [110, 65], "diameter": 20, "stroke_width": 2,
                "fill_color": "yellow", "stroke_color": "blue"}},
            {"Ellipse": {"top_left": [70, 125], "size": [50, 30], "stroke_width": 4,
                "fill_color": "yellow", "stroke_color": "#00f"}},
            {"Polyline": {"points": [[160, 120], [216, 120], [182, 155]],
                "color": "#ff0", "stroke_width": 4}},
            {"Triangle": {"vertex1": [40, 10], "vertex2": [80, 60], "vertex3": [10, 60],
                "stroke_width": 4, "fill_color": "red", "stroke_color": "yellow"}},
            {"Arc": {"top_left": [110, 110], "diameter": 60, "stroke_width": 4,
                "angle_start": 0, "angle_sweep": 180, "color": "red"}},
            {"Sector": {"top_left": [150, 100], "diameter": 60, "stroke_width": 4,
                "angle_start": 0, "angle_sweep": 120, "fill_color": "red", "stroke_color": "blue"}},
            {"Image": {"x": 0, "y": 120, "key": "1"}}
        ]"##;
        let batch = CanvasBatch::from_json(json).unwrap();
        let kinds: Vec<&str> = batch.iter().map(CanvasCommand::kind).collect();
        assert_eq!(
            kinds,
            [
                "RoundedRectangle",
                "Circle",
                "Ellipse",
                "Polyline",
                "Triangle",
                "Arc",
                "Sector",
                "Image"
            ]
        );
        batch.validate().unwrap();

        match &batch.commands()[5] {
            CanvasCommand::Arc(arc) => assert_eq!(arc.angle_sweep, 180.0),
            other => panic!("expected Arc, got {other:?}"),
        }
    }

    #[test]
    fn test_demo_sampler_file_is_valid() {
        let batch = CanvasBatch::from_json(include_str!("../../../demos/sampler.json")).unwrap();
        assert_eq!(batch.len(), 11);
        batch.validate().unwrap();
    }

    #[test]
    fn test_batch_preserves_order() {
        let batch = CanvasBatch::new()
            .with(Text::new(0, 0, "a", 10, "white"))
            .with(Rectangle::new(1, 1, 2, 2))
            .with(Text::new(0, 0, "b", 10, "white"));
        let value = serde_json::to_value(&batch).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0]["Text"]["text"], "a");
        assert!(arr[1].get("Rectangle").is_some());
        assert_eq!(arr[2]["Text"]["text"], "b");
    }

    #[test]
    fn test_cleared_batch_covers_display() {
        let batch = CanvasBatch::cleared(&DisplayConfig::new(320, 240), "black");
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.commands()[0],
            CanvasCommand::Rectangle(Rectangle {
                left: 0,
                top: 0,
                width: 320,
                height: 240,
                fill_color: Some("black".into()),
                stroke_color: None,
                stroke_width: 0,
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        let err = CanvasBatch::new().validate().unwrap_err();
        assert!(matches!(err, ScreenError::InvalidBatch(_)));
    }

    #[test]
    fn test_validate_rejects_empty_color() {
        let batch = CanvasBatch::new().with(Text::new(0, 0, "x", 12, ""));
        let err = batch.validate().unwrap_err();
        assert!(err.to_string().contains("#0 Text"), "got: {err}");
    }

    #[test]
    fn test_validate_image_source() {
        let both = Image {
            x: 0,
            y: 0,
            key: Some("1".into()),
            base64: Some("AAAA".into()),
        };
        assert!(CanvasBatch::new().with(both).validate().is_err());

        let neither = Image {
            x: 0,
            y: 0,
            key: None,
            base64: None,
        };
        assert!(CanvasBatch::new().with(neither).validate().is_err());

        assert!(CanvasBatch::new().with(Image::cached(0, 0, "1")).validate().is_ok());
    }

    #[test]
    fn test_validate_short_polyline() {
        let line = Polyline {
            points: vec![(0, 0)],
            stroke_width: 1,
            color: "red".into(),
        };
        let err = CanvasBatch::new().with(line).validate().unwrap_err();
        assert!(err.to_string().contains("at least 2 points"));
    }

    #[test]
    fn test_inline_image_is_base64() {
        let img = Image::inline(0, 50, b"GIF89a");
        assert_eq!(img.base64.as_deref(), Some("R0lGODlh"));
        assert!(img.key.is_none());
    }
}
