use crate::{Skeleton, Timeline};
use glam::Vec3;

/// Normalised RGB colour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::new(1.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// World-space debug lines, ready for a host line renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineList {
    pub lines: Vec<Line>,
}

impl LineList {
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Polygon fill mode requested from the host renderer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DrawMode {
    #[default]
    Normal,
    Wireframe,
}

impl DrawMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Wireframe,
            Self::Wireframe => Self::Normal,
        }
    }
}

/// How [`push_shape`] groups its vertices into outlines.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShapeMode {
    Points,
    Lines,
    Triangles,
    Quads,
    /// All vertices form one closed outline.
    Polygon,
}

impl ShapeMode {
    fn vertices_per_shape(self, vertex_count: usize) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
            Self::Quads => 4,
            Self::Polygon => vertex_count,
        }
    }
}

pub fn push_line(out: &mut LineList, start: Vec3, end: Vec3, color: Color) {
    out.lines.push(Line { start, end, color });
}

/// Three axis-aligned segments of length `size` centred on `position`.
pub fn push_cross(out: &mut LineList, position: Vec3, color: Color, size: f32) {
    let half = size / 2.0;
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        push_line(out, position - axis * half, position + axis * half, color);
    }
}

/// A cross plus the four cube diagonals.
pub fn push_star(out: &mut LineList, position: Vec3, color: Color, size: f32) {
    push_cross(out, position, color, size);

    let h = size * 0.707 / 2.0;
    let diagonals = [
        (Vec3::new(-h, -h, -h), Vec3::new(h, h, h)),
        (Vec3::new(-h, h, -h), Vec3::new(h, -h, h)),
        (Vec3::new(h, -h, -h), Vec3::new(-h, h, h)),
        (Vec3::new(h, h, -h), Vec3::new(-h, -h, h)),
    ];
    for (from, to) in diagonals {
        push_line(out, position + from, position + to, color);
    }
}

/// Outlines consecutive groups of vertices; an incomplete trailing group is ignored.
pub fn push_shape(out: &mut LineList, mode: ShapeMode, vertices: &[Vec3], color: Color) {
    let per_shape = mode.vertices_per_shape(vertices.len());
    if per_shape == 0 {
        return;
    }
    for shape in vertices.chunks_exact(per_shape) {
        match shape {
            [point] => push_line(out, *point, *point, color),
            [start, end] => push_line(out, *start, *end, color),
            _ => {
                for (i, start) in shape.iter().enumerate() {
                    let end = shape[(i + 1) % shape.len()];
                    push_line(out, *start, end, color);
                }
            }
        }
    }
}

const SEGMENT_TOP: u16 = 1 << 0;
const SEGMENT_BOTTOM: u16 = 1 << 1;
const SEGMENT_TOP_LEFT: u16 = 1 << 2;
const SEGMENT_TOP_RIGHT: u16 = 1 << 3;
const SEGMENT_BOTTOM_LEFT: u16 = 1 << 4;
const SEGMENT_BOTTOM_RIGHT: u16 = 1 << 5;
const SEGMENT_MIDDLE: u16 = 1 << 6;

const DIGIT_SEGMENTS: [u16; 10] = [
    // 0
    SEGMENT_TOP
        | SEGMENT_BOTTOM
        | SEGMENT_TOP_LEFT
        | SEGMENT_TOP_RIGHT
        | SEGMENT_BOTTOM_LEFT
        | SEGMENT_BOTTOM_RIGHT,
    // 1
    SEGMENT_TOP_RIGHT | SEGMENT_BOTTOM_RIGHT,
    // 2
    SEGMENT_TOP | SEGMENT_BOTTOM | SEGMENT_TOP_RIGHT | SEGMENT_BOTTOM_LEFT | SEGMENT_MIDDLE,
    // 3
    SEGMENT_TOP | SEGMENT_BOTTOM | SEGMENT_TOP_RIGHT | SEGMENT_BOTTOM_RIGHT | SEGMENT_MIDDLE,
    // 4
    SEGMENT_TOP_LEFT | SEGMENT_TOP_RIGHT | SEGMENT_BOTTOM_RIGHT | SEGMENT_MIDDLE,
    // 5
    SEGMENT_TOP | SEGMENT_BOTTOM | SEGMENT_TOP_LEFT | SEGMENT_BOTTOM_RIGHT | SEGMENT_MIDDLE,
    // 6
    SEGMENT_TOP
        | SEGMENT_BOTTOM
        | SEGMENT_TOP_LEFT
        | SEGMENT_BOTTOM_LEFT
        | SEGMENT_BOTTOM_RIGHT
        | SEGMENT_MIDDLE,
    // 7
    SEGMENT_TOP | SEGMENT_TOP_RIGHT | SEGMENT_BOTTOM_RIGHT,
    // 8
    SEGMENT_TOP
        | SEGMENT_BOTTOM
        | SEGMENT_TOP_LEFT
        | SEGMENT_TOP_RIGHT
        | SEGMENT_BOTTOM_LEFT
        | SEGMENT_BOTTOM_RIGHT
        | SEGMENT_MIDDLE,
    // 9
    SEGMENT_TOP
        | SEGMENT_BOTTOM
        | SEGMENT_TOP_LEFT
        | SEGMENT_TOP_RIGHT
        | SEGMENT_BOTTOM_RIGHT
        | SEGMENT_MIDDLE,
];

/// Seven-segment digit in the XZ plane, centred on `position`. Only `digit % 10` is drawn.
pub fn push_digit(
    out: &mut LineList,
    digit: u8,
    position: Vec3,
    color: Color,
    width: f32,
    height: f32,
) {
    let segments = DIGIT_SEGMENTS[usize::from(digit % 10)];
    let up = Vec3::Z * (height / 2.0);
    let right = Vec3::X * (width / 2.0);

    let strokes = [
        (SEGMENT_TOP, position + up - right, position + up + right),
        (SEGMENT_BOTTOM, position - up - right, position - up + right),
        (SEGMENT_TOP_LEFT, position - right, position - right + up),
        (SEGMENT_TOP_RIGHT, position + right, position + right + up),
        (SEGMENT_BOTTOM_LEFT, position - right, position - right - up),
        (SEGMENT_BOTTOM_RIGHT, position + right, position + right - up),
        (SEGMENT_MIDDLE, position - right, position + right),
    ];
    for (segment, start, end) in strokes {
        if segments & segment != 0 {
            push_line(out, start, end, color);
        }
    }
}

/// Decimal number centred horizontally on `position`.
pub fn push_number(
    out: &mut LineList,
    number: u32,
    position: Vec3,
    color: Color,
    digit_spacing: f32,
    digit_width: f32,
    digit_height: f32,
) {
    let digits: Vec<u8> = number
        .to_string()
        .bytes()
        .map(|b| b.saturating_sub(b'0'))
        .collect();

    let advance = digit_width + digit_spacing;
    let start = position + Vec3::X * (advance * digits.len() as f32 * -0.5);
    for (i, digit) in digits.into_iter().enumerate() {
        let offset = Vec3::X * (advance * i as f32);
        push_digit(out, digit, start + offset, color, digit_width, digit_height);
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SkeletonStyle {
    pub bone_color: Color,
    pub root_bone_color: Color,
    pub joint_color: Color,
    pub bone_size: f32,
}

impl Default for SkeletonStyle {
    fn default() -> Self {
        Self {
            bone_color: Color::CYAN,
            root_bone_color: Color::BLUE,
            joint_color: Color::YELLOW,
            bone_size: 5.0,
        }
    }
}

pub fn build_skeleton_lines(skeleton: &Skeleton, offset: Vec3, style: &SkeletonStyle) -> LineList {
    let mut out = LineList::default();
    append_skeleton_lines(&mut out, skeleton, offset, style);
    out
}

/// A star per non-IK bone at its world position, and a joint line towards its parent.
pub fn append_skeleton_lines(
    out: &mut LineList,
    skeleton: &Skeleton,
    offset: Vec3,
    style: &SkeletonStyle,
) {
    let pose = skeleton.pose().as_slice();
    for bone in skeleton.bones() {
        if bone.is_ik() {
            continue;
        }
        let Some(transform) = pose.get(bone.index()) else {
            continue;
        };
        let position = transform.world_position();
        let parent_position = bone
            .parent_index()
            .and_then(|parent| pose.get(parent))
            .map_or(position, |parent| parent.world_position());

        let color = if bone.is_root() {
            style.root_bone_color
        } else {
            style.bone_color
        };
        push_star(out, position + offset, color, style.bone_size);
        push_line(out, position + offset, parent_position + offset, style.joint_color);
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimelineStyle {
    pub frame_spacing: f32,
    pub frame_indicator_length: f32,
    /// Number of stars (minus one) stacked on the current key tick.
    pub current_frame_indicator_thickness: u8,
    pub orientation: Vec3,
    pub indicator_disabled_color: Color,
    pub digit_spacing: f32,
    pub digit_width: f32,
    pub digit_height: f32,
}

impl Default for TimelineStyle {
    fn default() -> Self {
        Self {
            frame_spacing: 5.0,
            frame_indicator_length: 10.0,
            current_frame_indicator_thickness: 10,
            orientation: Vec3::Z,
            indicator_disabled_color: Color::from_rgb8(220, 220, 220),
            digit_spacing: 1.5,
            digit_width: 4.0,
            digit_height: 7.5,
        }
    }
}

pub fn build_timeline_lines(timeline: &Timeline, position: Vec3, style: &TimelineStyle) -> LineList {
    let mut out = LineList::default();
    append_timeline_lines(&mut out, timeline, position, style);
    out
}

/// Key ticks, a frame counter above them and play/pause/transition indicators below.
pub fn append_timeline_lines(
    out: &mut LineList,
    timeline: &Timeline,
    position: Vec3,
    style: &TimelineStyle,
) {
    append_key_frames(out, timeline, position, style);
    append_frame_counter(out, timeline, position + Vec3::new(0.0, 0.0, 20.0), style);

    let indicators = position + Vec3::new(0.0, 0.0, -10.0);
    append_play_indicator(out, timeline, indicators + Vec3::new(-20.0, 0.0, 0.0), style);
    append_pause_indicator(out, timeline, indicators, style);
    append_transition_indicator(out, timeline, indicators + Vec3::new(20.0, 0.0, 0.0), style);
}

fn inactive_gray() -> Color {
    Color::from_rgb8(150, 150, 150)
}

fn append_key_frames(out: &mut LineList, timeline: &Timeline, position: Vec3, style: &TimelineStyle) {
    let frame_count = timeline.last_key_frame(true) + 1;
    let spacing = style.frame_spacing;
    let length = style.frame_indicator_length;
    let orientation = style.orientation;

    let start = position - Vec3::X * ((frame_count - 1) as f32 * spacing * 0.5);

    if timeline.is_looping() {
        let anchor = if timeline.is_reversed() {
            start - Vec3::X * spacing
        } else {
            start + Vec3::X * (frame_count as f32 * spacing)
        };
        let color = if timeline.is_paused() {
            inactive_gray()
        } else {
            Color::from_rgb8(0, 150, 0)
        };
        push_line(
            out,
            anchor + orientation * (length * 0.2),
            anchor + orientation * (length * 0.8),
            color,
        );
    }

    let tick_color = if timeline.is_paused() {
        inactive_gray()
    } else {
        Color::BLACK
    };

    for key in 0..frame_count {
        let tick = start + Vec3::X * (spacing * key as f32);
        push_line(out, tick, tick + orientation * length, tick_color);

        if timeline.current_key_frame() != key {
            continue;
        }

        let alpha = if timeline.is_transitioning() {
            0.0
        } else if timeline.is_reversed() {
            -timeline.interpolation_alpha()
        } else {
            timeline.interpolation_alpha()
        };
        let alpha_offset = Vec3::X * (alpha * spacing);
        let color = if timeline.is_transitioning() {
            Color::BLUE
        } else {
            Color::RED
        };

        let thickness = style.current_frame_indicator_thickness;
        for star in 1..thickness {
            let along = length * (f32::from(star) / f32::from(thickness));
            push_star(out, tick + orientation * along + alpha_offset, color, 3.0);
        }
    }
}

fn append_frame_counter(
    out: &mut LineList,
    timeline: &Timeline,
    position: Vec3,
    style: &TimelineStyle,
) {
    let current = u32::try_from(timeline.current_key_frame() + 1).unwrap_or(u32::MAX);
    let last = u32::try_from(timeline.last_key_frame(true) + 1).unwrap_or(u32::MAX);
    let padding = 40.0;
    let separator = Vec3::new(2.5, 0.0, 5.0);

    push_number(
        out,
        current,
        position - Vec3::X * (padding * 0.5),
        Color::RED,
        style.digit_spacing,
        style.digit_width,
        style.digit_height,
    );
    push_line(out, position + separator, position - separator, Color::BLACK);
    push_number(
        out,
        last,
        position + Vec3::X * (padding * 0.5),
        Color::BLACK,
        style.digit_spacing,
        style.digit_width,
        style.digit_height,
    );
}

fn indicator_color(active: bool, active_color: Color, style: &TimelineStyle) -> Color {
    if active {
        active_color
    } else {
        style.indicator_disabled_color
    }
}

fn active_indicator_color() -> Color {
    Color::from_rgb8(50, 205, 90)
}

fn append_play_indicator(
    out: &mut LineList,
    timeline: &Timeline,
    position: Vec3,
    style: &TimelineStyle,
) {
    let vertices = [
        position + Vec3::new(-5.0, 0.0, 5.0),
        position + Vec3::new(5.0, 0.0, 0.0),
        position + Vec3::new(-5.0, 0.0, -5.0),
    ];
    let color = indicator_color(timeline.is_playing(), active_indicator_color(), style);
    push_shape(out, ShapeMode::Triangles, &vertices, color);
}

fn append_pause_indicator(
    out: &mut LineList,
    timeline: &Timeline,
    position: Vec3,
    style: &TimelineStyle,
) {
    let vertices = [
        position + Vec3::new(-2.0, 0.0, 5.0),
        position + Vec3::new(-2.0, 0.0, -5.0),
        position + Vec3::new(2.0, 0.0, 5.0),
        position + Vec3::new(2.0, 0.0, -5.0),
    ];
    let color = indicator_color(timeline.is_paused(), active_indicator_color(), style);
    push_shape(out, ShapeMode::Lines, &vertices, color);
}

fn append_transition_indicator(
    out: &mut LineList,
    timeline: &Timeline,
    position: Vec3,
    style: &TimelineStyle,
) {
    let vertices = [
        position + Vec3::new(-5.0, 0.0, 0.0),
        position + Vec3::new(5.0, 0.0, 0.0),
        position + Vec3::new(5.0, 0.0, 0.0),
        position + Vec3::new(1.0, 0.0, 3.0),
        position + Vec3::new(5.0, 0.0, 0.0),
        position + Vec3::new(1.0, 0.0, -3.0),
    ];
    let color = indicator_color(timeline.is_transitioning(), Color::BLUE, style);
    push_shape(out, ShapeMode::Lines, &vertices, color);
}
