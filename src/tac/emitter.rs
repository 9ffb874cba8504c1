// Temporary and label allocation

use super::quad::Address;

/// Allocates temporaries and labels for one compilation.
///
/// Numbers are handed out eagerly and never reused, so every compile that starts from
/// a fresh emitter produces the same names for the same input.
#[derive(Debug, Default, Clone)]
pub struct Emitter {
    next_temp: u32,
    next_label: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> Address {
        let temp = Address::Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    pub fn new_label(&mut self) -> Address {
        let label = Address::Label(self.next_label);
        self.next_label += 1;
        label
    }

    pub fn temps_allocated(&self) -> u32 {
        self.next_temp
    }

    pub fn labels_allocated(&self) -> u32 {
        self.next_label
    }
}
