//! Leave balance allocation

use shared::models::LeaveDetail;

/// Days charged by one approval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Allocation {
    pub paid: i32,
    pub unpaid: i32,
}

/// Charge `days` to `detail`, one day at a time
///
/// Every day counts toward `leaves_taken`. A day is paid while the paid
/// total is below `available_leaves`, unpaid after that.
pub fn allocate(detail: &mut LeaveDetail, days: i64) -> Allocation {
    let mut allocation = Allocation::default();
    for _ in 0..days.max(0) {
        detail.leaves_taken += 1;
        if detail.total_paid_leave_taken < detail.available_leaves {
            detail.total_paid_leave_taken += 1;
            allocation.paid += 1;
        } else {
            detail.total_unpaid_leave_taken += 1;
            allocation.unpaid += 1;
        }
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(available: i32, paid: i32) -> LeaveDetail {
        LeaveDetail {
            id: 1,
            user_id: 7,
            year: 2024,
            available_leaves: available,
            leaves_taken: paid,
            total_paid_leave_taken: paid,
            total_unpaid_leave_taken: 0,
        }
    }

    #[test]
    fn three_days_within_balance_are_paid() {
        let mut detail = balance(12, 0);
        let allocation = allocate(&mut detail, 3);
        assert_eq!(allocation, Allocation { paid: 3, unpaid: 0 });
        assert_eq!(detail.leaves_taken, 3);
        assert_eq!(detail.total_paid_leave_taken, 3);
    }

    #[test]
    fn overflow_spills_into_unpaid() {
        let mut detail = balance(12, 11);
        let allocation = allocate(&mut detail, 3);
        assert_eq!(allocation, Allocation { paid: 1, unpaid: 2 });
        assert_eq!(detail.leaves_taken, 14);
        assert_eq!(detail.total_paid_leave_taken, 12);
        assert_eq!(detail.total_unpaid_leave_taken, 2);
    }

    #[test]
    fn exhausted_balance_is_all_unpaid() {
        let mut detail = balance(0, 0);
        let allocation = allocate(&mut detail, 2);
        assert_eq!(allocation.unpaid, 2);
        assert_eq!(detail.total_paid_leave_taken, 0);
    }

    #[test]
    fn non_positive_span_changes_nothing() {
        let mut detail = balance(12, 0);
        assert_eq!(allocate(&mut detail, 0), Allocation::default());
        assert_eq!(allocate(&mut detail, -4), Allocation::default());
        assert_eq!(detail.leaves_taken, 0);
    }
}
