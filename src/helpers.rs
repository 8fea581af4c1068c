pub type ColorRGB = [u8; 3];

pub fn alpha_blend(bg: ColorRGB, fg: ColorRGB, alpha: f32) -> ColorRGB {
    let gamma = 2.2;
    let mut out: ColorRGB = [0, 0, 0];
    for i in 0..3 {
        out[i] = f32::powf(
            (1.0 - alpha) * f32::powf(bg[i] as f32, gamma) + alpha * f32::powf(fg[i] as f32, gamma),
            1.0 / gamma,
        ) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(alpha_blend([10, 20, 30], [200, 0, 0], 0.0), [10, 20, 30]);
        let full = alpha_blend([10, 20, 30], [200, 0, 0], 1.0);
        assert!(full[0] >= 199 && full[1] == 0 && full[2] == 0);
    }

    #[test]
    fn blend_moves_towards_foreground() {
        let c = alpha_blend([0, 0, 0], [255, 0, 0], 0.25);
        assert!(c[0] > 0 && c[0] < 255);
    }
}
