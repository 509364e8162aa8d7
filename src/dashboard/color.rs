use palette::Srgb;

/// An sRGB colour as handed to the renderer.
pub type Rgb = [u8; 3];

/// Convert one of palette's named CSS colours (`palette::named::SKYBLUE`, ...).
pub fn named(color: Srgb<u8>) -> Rgb {
    [color.red, color.green, color.blue]
}
