/// Ink colour for text, borders and fills
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB, components from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceGray, 0.0 is black
    Grey { g: f32 },
}

/// Colours used by the document composers
pub mod colours {
    use super::Colour;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    /// Dark blue of a rubber stamp pad, used for the director's stamp
    pub const STAMP_BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.13,
        b: 0.55,
    };
    /// Border and text colour of the receive-number stamp
    pub const STAMP_RED: Colour = Colour::RGB {
        r: 0.8,
        g: 0.0,
        b: 0.0,
    };
}
