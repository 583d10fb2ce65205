use rand::Rng;

/// Random `#rrggbb` color for drones created without one.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let value: u32 = rng.gen_range(0..=0xFF_FF_FF);
    format!("#{:06x}", value)
}

/// True for the `#rrggbb` shape produced by [`random_color`].
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
