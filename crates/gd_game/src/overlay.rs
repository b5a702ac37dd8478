//! CPU-rasterised HUD content: score strip, holiday spirit gauge and the
//! game-over banner. Each function redraws its whole canvas.

use gd_render::canvas::{Canvas, Color, GradientStop};

pub const STRIP_WIDTH: u32 = 960;
pub const STRIP_HEIGHT: u32 = 48;
pub const BANNER_WIDTH: u32 = 960;
pub const BANNER_HEIGHT: u32 = 720;

pub const SCORE_LABEL: &str = "Score: ";
pub const SPIRIT_LABEL: &str = "Holiday Spirit: ";
pub const GAME_OVER_TITLE: &str = "Game Over";
pub const GAME_OVER_MESSAGE: &str = "Happy Holidays from Katie and Ayo!";

const TEXT_LEFT_MARGIN: i32 = 15;
const SCORE_TEXT_SCALE: u32 = 3;
const SPIRIT_LABEL_SCALE: u32 = 2;
const TEXT_COLOR: Color = Color::WHITE;
const TEXT_BACKDROP_COLOR: Color = Color::rgba(0.2, 0.2, 0.2, 0.2);

const GAUGE_WIDTH: u32 = 650;
const GAUGE_BORDER: u32 = 4;
const GAUGE_OUTLINE_THICKNESS: u32 = 2;
const GAUGE_HEIGHT_MARGIN: u32 = 5;
const GAUGE_OUTLINE_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.9);
const GAUGE_MIN_COLOR: Color = Color::rgba(1.0, 0.0, 0.0, 0.75);
const GAUGE_MAX_COLOR: Color = Color::rgba(0.0, 1.0, 0.0, 0.75);
const GAUGE_GLINT_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
/// Fraction of the filled width after which the fill fades into the glint.
const GAUGE_GLINT_START: f32 = 0.92;

const BANNER_BACKGROUND: Color = Color::rgba(0.0, 0.0, 0.0, 0.8);
const BANNER_TITLE_SCALE: u32 = 8;
const BANNER_MESSAGE_SCALE: u32 = 3;
const BANNER_LINE_GAP: u32 = 24;

pub fn score_text(score: u64) -> String {
    format!("{SCORE_LABEL}{score}")
}

pub fn draw_score_strip(canvas: &mut Canvas, score: u64) {
    canvas.clear();
    canvas.fill_rect(0, 0, canvas.width(), canvas.height(), TEXT_BACKDROP_COLOR);
    let y = centered(canvas.height(), Canvas::text_height(SCORE_TEXT_SCALE));
    canvas.draw_text(&score_text(score), TEXT_LEFT_MARGIN, y, SCORE_TEXT_SCALE, TEXT_COLOR);
}

/// Left edge of the gauge outline, right after the label.
pub fn gauge_left() -> i32 {
    TEXT_LEFT_MARGIN + Canvas::text_width(SPIRIT_LABEL, SPIRIT_LABEL_SCALE) as i32 + TEXT_LEFT_MARGIN
}

/// Width in pixels of the coloured fill for a spirit fraction in `[0, 1]`.
pub fn gauge_fill_width(fraction: f32) -> u32 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((GAUGE_WIDTH as f32 * fraction).floor() as u32).saturating_sub(2 * GAUGE_BORDER)
}

pub fn gauge_fill_color(fraction: f32) -> Color {
    GAUGE_MIN_COLOR.blend(&GAUGE_MAX_COLOR, fraction)
}

pub fn draw_spirit_gauge(canvas: &mut Canvas, fraction: f32) {
    canvas.clear();
    let label_y = centered(canvas.height(), Canvas::text_height(SPIRIT_LABEL_SCALE));
    canvas.draw_text(SPIRIT_LABEL, TEXT_LEFT_MARGIN, label_y, SPIRIT_LABEL_SCALE, TEXT_COLOR);

    let left = gauge_left();
    let height = canvas.height().saturating_sub(GAUGE_HEIGHT_MARGIN);
    for inset in 0..GAUGE_OUTLINE_THICKNESS {
        canvas.stroke_rect(
            left + inset as i32,
            inset as i32,
            GAUGE_WIDTH.saturating_sub(2 * inset),
            height.saturating_sub(2 * inset),
            GAUGE_OUTLINE_COLOR,
        );
    }

    let fill_width = gauge_fill_width(fraction);
    if fill_width == 0 {
        return;
    }
    let color = gauge_fill_color(fraction);
    let stops = [
        GradientStop { offset: 0.0, color },
        GradientStop {
            offset: GAUGE_GLINT_START,
            color,
        },
        GradientStop {
            offset: 1.0,
            color: GAUGE_GLINT_COLOR,
        },
    ];
    canvas.fill_horizontal_gradient(
        left + GAUGE_BORDER as i32,
        GAUGE_BORDER as i32,
        fill_width,
        height.saturating_sub(2 * GAUGE_BORDER),
        &stops,
    );
}

pub fn draw_game_over_banner(canvas: &mut Canvas) {
    canvas.clear();
    canvas.fill_rect(0, 0, canvas.width(), canvas.height(), BANNER_BACKGROUND);

    let title_height = Canvas::text_height(BANNER_TITLE_SCALE);
    let message_height = Canvas::text_height(BANNER_MESSAGE_SCALE);
    let top = centered(canvas.height(), title_height + BANNER_LINE_GAP + message_height);

    let title_x = centered(
        canvas.width(),
        Canvas::text_width(GAME_OVER_TITLE, BANNER_TITLE_SCALE),
    );
    canvas.draw_text(GAME_OVER_TITLE, title_x, top, BANNER_TITLE_SCALE, TEXT_COLOR);

    let message_x = centered(
        canvas.width(),
        Canvas::text_width(GAME_OVER_MESSAGE, BANNER_MESSAGE_SCALE),
    );
    let message_y = top + (title_height + BANNER_LINE_GAP) as i32;
    canvas.draw_text(GAME_OVER_MESSAGE, message_x, message_y, BANNER_MESSAGE_SCALE, TEXT_COLOR);
}

fn centered(outer: u32, inner: u32) -> i32 {
    (outer as i32 - inner as i32) / 2
}
