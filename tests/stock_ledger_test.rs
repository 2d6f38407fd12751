// ==========================================
// 库存账本集成测试
// ==========================================
// 测试范围:
// 1. 并发预占: 成功次数不超过库存，最终库存 = 初始 - 成功总量
// 2. 跨连接并发（存储层条件更新）
// 3. 预占/回补往返与流水
// ==========================================

mod helpers;

#[cfg(test)]
mod stock_ledger_test {
    use crate::helpers::test_data_builder::{MenuItemBuilder, RestaurantBuilder};
    use crate::test_helpers::{create_test_db, create_test_state};
    use food_delivery::api::ApiError;
    use food_delivery::app::AppState;
    use food_delivery::StockMovementType;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn seed_item(state: &AppState, stock: i32) -> i64 {
        let restaurant = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Ledger Test").build())
            .unwrap();
        state
            .menu_item_api
            .create_menu_item(restaurant.restaurant_id, &MenuItemBuilder::new("Item").stock(stock).build())
            .unwrap()
            .menu_item_id
    }

    // ==========================================
    // 测试1: 单连接多线程
    // ==========================================

    #[test]
    fn test_concurrent_reserve_never_oversells() {
        let (_tmp, state) = create_test_state();
        let item = seed_item(&state, 10);
        let stock_api = state.stock_api.clone();
        let succeeded = Arc::new(AtomicI32::new(0));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let api = stock_api.clone();
                let succeeded = succeeded.clone();
                thread::spawn(move || match api.reserve_stock(item, 1) {
                    Ok(after) => {
                        assert!(after >= 0);
                        succeeded.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(ApiError::InsufficientStock { .. }) => {}
                    Err(e) => panic!("unexpected: {}", e),
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(succeeded.load(Ordering::SeqCst), 10);
        assert_eq!(stock_api.current_stock(item).unwrap(), 0);
        println!("✅ 20 个线程争抢 10 份库存，恰好 10 个成功");
    }

    #[test]
    fn test_mixed_quantities_conserve_stock() {
        let (_tmp, state) = create_test_state();
        let item = seed_item(&state, 100);
        let stock_api = state.stock_api.clone();
        let reserved = Arc::new(AtomicI32::new(0));

        let handles: Vec<_> = (1..=8)
            .map(|quantity| {
                let api = stock_api.clone();
                let reserved = reserved.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        if api.reserve_stock(item, quantity).is_ok() {
                            reserved.fetch_add(quantity, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let final_stock = stock_api.current_stock(item).unwrap();
        assert!(final_stock >= 0);
        assert_eq!(final_stock, 100 - reserved.load(Ordering::SeqCst));
    }

    // ==========================================
    // 测试2: 两个独立连接
    // ==========================================

    #[test]
    fn test_reserve_is_atomic_across_connections() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let state_a = AppState::new(db_path.clone()).unwrap();
        let state_b = AppState::new(db_path).unwrap();
        let item = seed_item(&state_a, 20);
        let succeeded = Arc::new(AtomicI32::new(0));

        let mut handles = Vec::new();
        for api in [state_a.stock_api.clone(), state_b.stock_api.clone()] {
            for _ in 0..4 {
                let api = api.clone();
                let succeeded = succeeded.clone();
                handles.push(thread::spawn(move || {
                    for _ in 0..10 {
                        match api.reserve_stock(item, 1) {
                            Ok(_) => {
                                succeeded.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(ApiError::InsufficientStock { .. }) => {}
                            Err(e) => panic!("unexpected: {}", e),
                        }
                    }
                }));
            }
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(succeeded.load(Ordering::SeqCst), 20);
        assert_eq!(state_b.stock_api.current_stock(item).unwrap(), 0);
        assert_eq!(state_a.stock_api.list_movements(item).unwrap().len(), 20);
    }

    // ==========================================
    // 测试3: 往返与参数校验
    // ==========================================

    #[test]
    fn test_round_trip_and_audit_trail() {
        let (_tmp, state) = create_test_state();
        let item = seed_item(&state, 7);

        assert!(state.stock_api.check_availability(item, 7).unwrap());
        assert!(!state.stock_api.check_availability(item, 8).unwrap());

        assert_eq!(state.stock_api.reserve_stock(item, 4).unwrap(), 3);
        assert_eq!(state.stock_api.release_stock(item, 4).unwrap(), 7);

        let movements = state.stock_api.list_movements(item).unwrap();
        let kinds: Vec<_> = movements.iter().map(|m| (m.movement_type, m.quantity, m.stock_after)).collect();
        assert_eq!(
            kinds,
            vec![(StockMovementType::Reserve, 4, 3), (StockMovementType::Release, 4, 7)]
        );
    }

    #[test]
    fn test_unavailable_item_cannot_be_reserved() {
        let (_tmp, state) = create_test_state();
        let restaurant = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Sold Out").build())
            .unwrap();
        let item = state
            .menu_item_api
            .create_menu_item(
                restaurant.restaurant_id,
                &MenuItemBuilder::new("Hidden").stock(5).unavailable().build(),
            )
            .unwrap();

        assert!(!state.stock_api.check_availability(item.menu_item_id, 1).unwrap());
        assert!(matches!(
            state.stock_api.reserve_stock(item.menu_item_id, 1),
            Err(ApiError::InsufficientStock { .. })
        ));
        assert_eq!(state.stock_api.current_stock(item.menu_item_id).unwrap(), 5);
    }

    #[test]
    fn test_argument_errors() {
        let (_tmp, state) = create_test_state();
        let item = seed_item(&state, 1);

        assert!(matches!(state.stock_api.reserve_stock(item, 0), Err(ApiError::InvalidInput(_))));
        assert!(matches!(state.stock_api.release_stock(item, -3), Err(ApiError::InvalidInput(_))));
        assert!(matches!(state.stock_api.reserve_stock(555, 1), Err(ApiError::NotFound(_))));
        assert!(matches!(state.stock_api.release_stock(555, 1), Err(ApiError::NotFound(_))));
        assert!(matches!(state.stock_api.check_availability(555, 1), Err(ApiError::NotFound(_))));
    }
}
