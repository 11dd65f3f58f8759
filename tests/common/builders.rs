//! Test data builders for creating connection-vector streams

/// Builder for Tmix connection-vector text
pub struct CvecStreamBuilder {
    text: String,
    records: usize,
}

impl CvecStreamBuilder {
    pub fn new() -> Self {
        Self {
            text: String::from("# generated connection vectors\n"),
            records: 0,
        }
    }

    /// Append `count` sequential records. Each record's initiator port is
    /// its index in the stream, so order can be checked after handoff.
    pub fn sequential(mut self, count: usize) -> Self {
        for _ in 0..count {
            let n = self.records;
            self.text.push_str(&format!(
                "SEQ {} 2 {} 80\nw 65535 65535\nr 1500\nl 0.0 0.0\n> 320\nt 1200\n< 4096\n> 120\nt 300\n< 88\n",
                n * 1000,
                n
            ));
            self.records += 1;
        }
        self
    }

    /// Append `count` concurrent records
    pub fn concurrent(mut self, count: usize) -> Self {
        for _ in 0..count {
            let n = self.records;
            self.text.push_str(&format!(
                "CONC {} 2 1 {} 443\nw 5840 5840\nr 22000\nl 0.001 0.002\nc> 517\nt> 40\nc< 1460\nc> 126\n\n",
                n * 1000,
                n
            ));
            self.records += 1;
        }
        self
    }

    /// Append a line that cannot be parsed
    pub fn malformed(mut self) -> Self {
        self.text.push_str("SEQ 1 1 1 1\n> not-a-number\n");
        self
    }

    /// Append a header with a missing field
    pub fn malformed_header(mut self) -> Self {
        self.text.push_str("SEQ 99 1 1\n> 10\n");
        self
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn build(self) -> String {
        self.text
    }
}

impl Default for CvecStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_counts_records() {
        let builder = CvecStreamBuilder::new().sequential(2).concurrent(3);
        assert_eq!(builder.records(), 5);
        let text = builder.build();
        assert_eq!(text.matches("SEQ ").count(), 2);
        assert_eq!(text.matches("CONC ").count(), 3);
    }
}
