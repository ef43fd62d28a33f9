//! Mapping from logical blend modes to GL compositing state

use crate::params::BlendMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendEquation {
    Add,
    /// `dst - src`
    ReverseSubtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    SrcColor,
}

/// Full compositing state for one population. Alpha factors mirror the color
/// factors for every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendConfig {
    pub equation: BlendEquation,
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendConfig {
    const fn uniform(equation: BlendEquation, src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            equation,
            src,
            dst,
            src_alpha: src,
            dst_alpha: dst,
        }
    }

    pub const fn for_mode(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Normal => Self::uniform(
                BlendEquation::Add,
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
            ),
            BlendMode::Additive => {
                Self::uniform(BlendEquation::Add, BlendFactor::SrcAlpha, BlendFactor::One)
            }
            // No GL preset exists for subtraction; darken the destination by
            // the source weighted with its alpha.
            BlendMode::Subtractive => Self::uniform(
                BlendEquation::ReverseSubtract,
                BlendFactor::SrcAlpha,
                BlendFactor::One,
            ),
            BlendMode::Multiply => {
                Self::uniform(BlendEquation::Add, BlendFactor::Zero, BlendFactor::SrcColor)
            }
        }
    }

    /// Apply to the current GL context
    pub fn apply(&self, gl: &glow::Context) {
        use glow::HasContext;
        unsafe {
            gl.enable(glow::BLEND);
            let equation = gl_equation(self.equation);
            gl.blend_equation_separate(equation, equation);
            gl.blend_func_separate(
                gl_factor(self.src),
                gl_factor(self.dst),
                gl_factor(self.src_alpha),
                gl_factor(self.dst_alpha),
            );
        }
    }
}

fn gl_equation(equation: BlendEquation) -> u32 {
    match equation {
        BlendEquation::Add => glow::FUNC_ADD,
        BlendEquation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
    }
}

fn gl_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::SrcColor => glow::SRC_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtractive_uses_reverse_subtract() {
        let config = BlendConfig::for_mode(BlendMode::Subtractive);
        assert_eq!(config.equation, BlendEquation::ReverseSubtract);
        assert_eq!(config.src, BlendFactor::SrcAlpha);
        assert_eq!(config.dst, BlendFactor::One);
        assert_eq!(gl_equation(config.equation), glow::FUNC_REVERSE_SUBTRACT);
    }

    #[test]
    fn test_alpha_factors_match_color_factors() {
        for mode in BlendMode::ALL {
            let config = BlendConfig::for_mode(mode);
            assert_eq!(config.src, config.src_alpha);
            assert_eq!(config.dst, config.dst_alpha);
        }
    }

    #[test]
    fn test_additive_and_normal() {
        assert_eq!(BlendConfig::for_mode(BlendMode::Additive).dst, BlendFactor::One);
        assert_eq!(
            BlendConfig::for_mode(BlendMode::Normal).dst,
            BlendFactor::OneMinusSrcAlpha
        );
        assert_eq!(gl_factor(BlendFactor::SrcColor), glow::SRC_COLOR);
    }
}
