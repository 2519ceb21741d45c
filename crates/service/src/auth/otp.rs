use rand::Rng;

/// Source of one-time codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Zero-padded decimal codes of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct NumericCodeGenerator {
    digits: u32,
}

impl NumericCodeGenerator {
    pub fn new(digits: u32) -> Self {
        Self { digits: digits.clamp(4, 10) }
    }
}

impl Default for NumericCodeGenerator {
    fn default() -> Self { Self::new(6) }
}

impl CodeGenerator for NumericCodeGenerator {
    fn generate(&self) -> String {
        let upper = 10u64.pow(self.digits);
        let n = rand::thread_rng().gen_range(0..upper);
        format!("{:0width$}", n, width = self.digits as usize)
    }
}
