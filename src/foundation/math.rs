pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

pub(crate) fn premul_channel(c: u8, a: u8) -> u8 {
    mul_div255_u16(u16::from(c), u16::from(a)) as u8
}
