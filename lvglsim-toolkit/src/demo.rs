//! Demo content rendered by the software toolkit.
//!
//! The widgets demo is a three-tab screen (profile, analytics, shop) that the
//! slideshow timer cycles through. The hello label is the bring-up screen for
//! small monochrome panels.

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::types::Key;

pub mod colors {
    use embedded_graphics::pixelcolor::Rgb888;

    pub const BG: Rgb888 = Rgb888::new(240, 242, 245);
    pub const TAB_BAR: Rgb888 = Rgb888::new(33, 150, 243);
    pub const TAB_ACTIVE: Rgb888 = Rgb888::new(255, 255, 255);
    pub const TAB_TEXT: Rgb888 = Rgb888::new(225, 240, 255);
    pub const CARD: Rgb888 = Rgb888::new(255, 255, 255);
    pub const TEXT: Rgb888 = Rgb888::new(40, 44, 52);
    pub const TEXT_MUTED: Rgb888 = Rgb888::new(120, 126, 135);
    pub const ACCENT: Rgb888 = Rgb888::new(33, 150, 243);
    pub const TRACK: Rgb888 = Rgb888::new(210, 214, 220);
    pub const SELECTED: Rgb888 = Rgb888::new(222, 237, 252);
}

use colors::*;

/// Tab titles, in slideshow order.
pub const SLIDES: [&str; 3] = ["Profile", "Analytics", "Shop"];

const CHART_VALUES: [u32; 7] = [35, 60, 45, 80, 55, 90, 70];

const SHOP_ITEMS: [(&str, &str); 4] = [
    ("Blue jeans", "$722"),
    ("Blue T-shirt", "$411"),
    ("Red hoodie", "$917"),
    ("Sneakers", "$64"),
];

const TAB_BAR_MAX: u32 = 40;
const PADDING: i32 = 12;

/// State of the widgets demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetsDemo {
    slide: usize,
    switch_on: bool,
    slider: u8,
    selected_item: usize,
}

impl Default for WidgetsDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetsDemo {
    pub fn new() -> Self {
        Self {
            slide: 0,
            switch_on: false,
            slider: 40,
            selected_item: 0,
        }
    }

    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn switch_on(&self) -> bool {
        self.switch_on
    }

    pub fn slider(&self) -> u8 {
        self.slider
    }

    pub fn next_slide(&mut self) {
        self.slide = (self.slide + 1) % SLIDES.len();
    }

    pub fn prev_slide(&mut self) {
        self.slide = (self.slide + SLIDES.len() - 1) % SLIDES.len();
    }

    /// Apply a key press. Returns true if the screen needs a redraw.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Right | Key::Tab => {
                self.next_slide();
                true
            }
            Key::Left => {
                self.prev_slide();
                true
            }
            Key::Enter if self.slide == 0 => {
                self.switch_on = !self.switch_on;
                true
            }
            Key::Up => self.step(1),
            Key::Down => self.step(-1),
            _ => false,
        }
    }

    fn step(&mut self, direction: i32) -> bool {
        match self.slide {
            0 => {
                let value = (self.slider as i32 + direction * 10).clamp(0, 100) as u8;
                let changed = value != self.slider;
                self.slider = value;
                changed
            }
            2 => {
                let count = SHOP_ITEMS.len() as i32;
                self.selected_item = (self.selected_item as i32 - direction).rem_euclid(count) as usize;
                true
            }
            _ => false,
        }
    }

    /// Apply a pointer event on a display of the given size.
    /// Returns true if the screen needs a redraw.
    pub fn handle_pointer(&mut self, x: i32, y: i32, pressed: bool, size: Size) -> bool {
        if !pressed || x < 0 || y < 0 || size.width == 0 {
            return false;
        }
        if (y as u32) < tab_bar_height(size) {
            let tab_width = (size.width / SLIDES.len() as u32).max(1);
            let tab = ((x as u32) / tab_width).min(SLIDES.len() as u32 - 1) as usize;
            let changed = tab != self.slide;
            self.slide = tab;
            return changed;
        }
        if self.slide == 0 {
            self.switch_on = !self.switch_on;
            return true;
        }
        false
    }

    pub fn draw<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let size = display.bounding_box().size;
        display.clear(BG)?;
        self.draw_tab_bar(display, size)?;

        let bar = tab_bar_height(size) as i32;
        let card = Rectangle::new(
            Point::new(PADDING, bar + PADDING),
            Size::new(
                size.width.saturating_sub(2 * PADDING as u32),
                size.height.saturating_sub(bar as u32 + 2 * PADDING as u32),
            ),
        );
        RoundedRectangle::with_equal_corners(card, Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(CARD))
            .draw(display)?;

        match self.slide {
            0 => self.draw_profile(display, card),
            1 => draw_analytics(display, card),
            _ => self.draw_shop(display, card),
        }
    }

    fn draw_tab_bar<D>(&self, display: &mut D, size: Size) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let bar = tab_bar_height(size);
        Rectangle::new(Point::zero(), Size::new(size.width, bar))
            .into_styled(PrimitiveStyle::with_fill(TAB_BAR))
            .draw(display)?;

        let tab_width = size.width / SLIDES.len() as u32;
        let centered = centered_style();
        for (i, title) in SLIDES.iter().enumerate() {
            let left = (i as u32 * tab_width) as i32;
            let color = if i == self.slide { TAB_ACTIVE } else { TAB_TEXT };
            Text::with_text_style(
                title,
                Point::new(left + tab_width as i32 / 2, bar as i32 / 2),
                MonoTextStyle::new(&FONT_6X10, color),
                centered,
            )
            .draw(display)?;

            if i == self.slide {
                Rectangle::new(
                    Point::new(left, bar as i32 - 3),
                    Size::new(tab_width, 3),
                )
                .into_styled(PrimitiveStyle::with_fill(TAB_ACTIVE))
                .draw(display)?;
            }
        }
        Ok(())
    }

    fn draw_profile<D>(&self, display: &mut D, card: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let origin = card.top_left + Point::new(PADDING, PADDING);
        Circle::new(origin, 40)
            .into_styled(PrimitiveStyle::with_fill(ACCENT))
            .draw(display)?;
        Text::new(
            "Elena Smith",
            origin + Point::new(52, 14),
            MonoTextStyle::new(&FONT_6X10, TEXT),
        )
        .draw(display)?;
        Text::new(
            "Simulator user",
            origin + Point::new(52, 30),
            MonoTextStyle::new(&FONT_6X10, TEXT_MUTED),
        )
        .draw(display)?;

        // Switch
        let switch_origin = origin + Point::new(0, 60);
        let track = Rectangle::new(switch_origin, Size::new(44, 22));
        let track_color = if self.switch_on { ACCENT } else { TRACK };
        RoundedRectangle::with_equal_corners(track, Size::new(11, 11))
            .into_styled(PrimitiveStyle::with_fill(track_color))
            .draw(display)?;
        let knob_x = if self.switch_on { 24 } else { 2 };
        Circle::new(switch_origin + Point::new(knob_x, 2), 18)
            .into_styled(PrimitiveStyle::with_fill(CARD))
            .draw(display)?;

        // Slider
        let slider_origin = origin + Point::new(0, 100);
        let slider_width = card.size.width.saturating_sub(2 * PADDING as u32);
        Rectangle::new(slider_origin, Size::new(slider_width, 6))
            .into_styled(PrimitiveStyle::with_fill(TRACK))
            .draw(display)?;
        Rectangle::new(
            slider_origin,
            Size::new(slider_width * self.slider as u32 / 100, 6),
        )
        .into_styled(PrimitiveStyle::with_fill(ACCENT))
        .draw(display)?;

        Ok(())
    }

    fn draw_shop<D>(&self, display: &mut D, card: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let row_height = 24;
        let width = card.size.width.saturating_sub(2 * PADDING as u32);
        for (i, (name, price)) in SHOP_ITEMS.iter().enumerate() {
            let top = card.top_left + Point::new(PADDING, PADDING + i as i32 * row_height);
            if i == self.selected_item {
                Rectangle::new(top, Size::new(width, row_height as u32))
                    .into_styled(PrimitiveStyle::with_fill(SELECTED))
                    .draw(display)?;
            }
            Text::new(name, top + Point::new(6, 15), MonoTextStyle::new(&FONT_6X10, TEXT))
                .draw(display)?;
            Text::with_alignment(
                price,
                top + Point::new(width as i32 - 6, 15),
                MonoTextStyle::new(&FONT_6X10, ACCENT),
                Alignment::Right,
            )
            .draw(display)?;
        }
        Ok(())
    }
}

fn draw_analytics<D>(display: &mut D, card: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let inner_width = card.size.width.saturating_sub(2 * PADDING as u32);
    let inner_height = card.size.height.saturating_sub(2 * PADDING as u32 + 12);
    let slot = inner_width / CHART_VALUES.len() as u32;
    let bar_width = (slot * 2 / 3).max(1);
    let baseline = card.top_left.y + PADDING + inner_height as i32;

    Text::new(
        "Monthly visitors",
        card.top_left + Point::new(PADDING, PADDING),
        MonoTextStyle::new(&FONT_6X10, TEXT_MUTED),
    )
    .draw(display)?;

    for (i, value) in CHART_VALUES.iter().enumerate() {
        let height = inner_height.saturating_sub(12) * value / 100;
        let left = card.top_left.x + PADDING + (i as u32 * slot) as i32;
        Rectangle::new(
            Point::new(left, baseline - height as i32),
            Size::new(bar_width, height),
        )
        .into_styled(PrimitiveStyle::with_fill(ACCENT))
        .draw(display)?;
    }
    Ok(())
}

/// Bring-up screen: white "hello world" centered on black.
pub fn draw_hello_label<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let size = display.bounding_box().size;
    display.clear(Rgb888::BLACK)?;
    Text::with_text_style(
        "hello world",
        Point::new(size.width as i32 / 2, size.height as i32 / 2),
        MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE),
        centered_style(),
    )
    .draw(display)?;
    Ok(())
}

fn tab_bar_height(size: Size) -> u32 {
    (size.height / 6).clamp(12, TAB_BAR_MAX)
}

fn centered_style() -> embedded_graphics::text::TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_slides_wrap_around() {
        let mut demo = WidgetsDemo::new();
        demo.prev_slide();
        assert_eq!(demo.slide(), SLIDES.len() - 1);
        demo.next_slide();
        assert_eq!(demo.slide(), 0);
    }

    #[test]
    fn test_enter_toggles_switch_on_profile_only() {
        let mut demo = WidgetsDemo::new();
        assert!(demo.handle_key(Key::Enter));
        assert!(demo.switch_on());

        demo.next_slide();
        assert!(!demo.handle_key(Key::Enter));
        assert!(demo.switch_on());
    }

    #[test]
    fn test_slider_clamps() {
        let mut demo = WidgetsDemo::new();
        for _ in 0..20 {
            demo.handle_key(Key::Up);
        }
        assert_eq!(demo.slider(), 100);
        assert!(!demo.handle_key(Key::Up));
    }

    #[test]
    fn test_pointer_selects_tab() {
        let mut demo = WidgetsDemo::new();
        let size = Size::new(300, 240);
        assert!(demo.handle_pointer(250, 5, true, size));
        assert_eq!(demo.slide(), 2);
        // Release events are ignored
        assert!(!demo.handle_pointer(10, 5, false, size));
        assert_eq!(demo.slide(), 2);
    }

    #[test]
    fn test_draw_on_tiny_surface_does_not_panic() {
        let mut surface = Surface::try_new(8, 8).unwrap();
        let mut demo = WidgetsDemo::new();
        for _ in 0..SLIDES.len() {
            demo.draw(&mut surface).unwrap();
            demo.next_slide();
        }
    }

    #[test]
    fn test_hello_label_lights_center() {
        let mut surface = Surface::try_new(128, 64).unwrap();
        draw_hello_label(&mut surface).unwrap();
        let lit = surface
            .frame()
            .pixels
            .iter()
            .filter(|p| **p == Rgb888::WHITE)
            .count();
        assert!(lit > 0);
        assert_eq!(surface.frame().pixel(0, 0), Some(Rgb888::BLACK));
    }
}
