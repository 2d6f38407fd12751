// ==========================================
// 餐厅营业判定集成测试
// ==========================================

mod helpers;

#[cfg(test)]
mod restaurant_availability_test {
    use crate::helpers::test_data_builder::RestaurantBuilder;
    use crate::test_helpers::{create_test_state, time};
    use food_delivery::api::ApiError;

    #[test]
    fn test_daytime_restaurant() {
        let (_tmp, state) = create_test_state();
        let r = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Lunch Spot").build())
            .unwrap();

        let api = &state.restaurant_api;
        assert!(api.is_open_at(r.restaurant_id, time("09:00:00")).unwrap());
        assert!(api.is_open_at(r.restaurant_id, time("22:00:00")).unwrap());
        assert!(!api.is_open_at(r.restaurant_id, time("22:00:01")).unwrap());
        assert!(!api.is_open_at(r.restaurant_id, time("03:00:00")).unwrap());
    }

    #[test]
    fn test_overnight_restaurant() {
        let (_tmp, state) = create_test_state();
        let r = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Late Night Ramen").hours((18, 0), (2, 0)).build())
            .unwrap();
        assert!(r.has_overnight_window());

        let api = &state.restaurant_api;
        assert!(api.is_open_at(r.restaurant_id, time("23:00:00")).unwrap());
        assert!(api.is_open_at(r.restaurant_id, time("01:59:59")).unwrap());
        assert!(!api.is_open_at(r.restaurant_id, time("02:30:00")).unwrap());
        assert!(!api.is_open_at(r.restaurant_id, time("17:00:00")).unwrap());

        println!("✅ 跨午夜营业窗口判定正确");
    }

    #[test]
    fn test_deactivated_restaurant_never_open() {
        let (_tmp, state) = create_test_state();
        let r = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Soon Closing").all_day().build())
            .unwrap();
        assert!(state.restaurant_api.is_open(r.restaurant_id).unwrap());

        let deactivated = state.restaurant_api.deactivate_restaurant(r.restaurant_id).unwrap();
        assert!(!deactivated.is_active);
        assert!(!state.restaurant_api.is_open(r.restaurant_id).unwrap());
        assert!(!state.restaurant_api.is_open_at(r.restaurant_id, time("12:00:00")).unwrap());
    }

    #[test]
    fn test_unknown_restaurant() {
        let (_tmp, state) = create_test_state();
        assert!(matches!(
            state.restaurant_api.is_open_at(77, time("12:00:00")),
            Err(ApiError::NotFound(_))
        ));
    }
}
