/// Free stock for one product as seen by an optional requester.
///
/// `available_stock` excludes the requester's own hold, so the largest
/// quantity the requester may hold is `available_stock + requester_reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub total_stock: i32,
    pub available_stock: i32,
    pub requester_reserved: i32,
}

impl Availability {
    pub fn compute(total_stock: i32, reserved_by_others: i64, requester_reserved: i32) -> Self {
        let available = (i64::from(total_stock) - reserved_by_others).clamp(0, i64::from(i32::MAX));

        Self {
            total_stock,
            available_stock: available as i32,
            requester_reserved,
        }
    }

    pub fn max_for_requester(&self) -> i32 {
        self.available_stock.saturating_add(self.requester_reserved)
    }

    pub fn admits(&self, quantity: i32) -> bool {
        quantity <= self.max_for_requester()
    }
}
