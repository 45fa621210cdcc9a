//! Text measurement capability used by axis and legend layout.

/// Size of a rendered piece of text
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Measures text without a live drawing surface
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent;
}

/// Fixed-advance approximation, about 7px per character at 12px
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxTextMeasure {
    /// Character advance as a fraction of the font size
    pub advance: f64,
    /// Line height as a fraction of the font size
    pub line_height: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            advance: 7.0 / 12.0,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        let chars = text.chars().count() as f64;
        TextExtent {
            width: chars * font_size * self.advance,
            height: if text.is_empty() {
                0.0
            } else {
                font_size * self.line_height
            },
        }
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        (**self).measure(text, font_size)
    }
}
