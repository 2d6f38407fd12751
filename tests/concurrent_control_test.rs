// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证并发下单/并发取消不会超卖或重复回补
// ==========================================

mod helpers;

#[cfg(test)]
mod concurrent_control_test {
    use crate::helpers::test_data_builder::{MenuItemBuilder, OrderRequestBuilder, RestaurantBuilder};
    use crate::test_helpers::create_test_state;
    use food_delivery::api::ApiError;
    use food_delivery::{OrderStatus, StockMovementType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    // ==========================================
    // 测试1: 并发下单争抢库存
    // ==========================================

    #[test]
    fn test_concurrent_orders_do_not_oversell() {
        let (_tmp, state) = create_test_state();
        let restaurant = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Rush Hour").all_day().build())
            .unwrap();
        let item = state
            .menu_item_api
            .create_menu_item(restaurant.restaurant_id, &MenuItemBuilder::new("Limited").stock(5).build())
            .unwrap();

        let created = Arc::new(AtomicUsize::new(0));
        let rejected = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let api = state.order_api.clone();
                let created = created.clone();
                let rejected = rejected.clone();
                let request = OrderRequestBuilder::new(restaurant.restaurant_id)
                    .line(item.menu_item_id, 1)
                    .phone(&format!("555-01{:02}", i))
                    .build();
                thread::spawn(move || match api.create_order(&request) {
                    Ok(_) => {
                        created.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(ApiError::InsufficientStock { .. }) => {
                        rejected.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected: {}", e),
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(created.load(Ordering::SeqCst), 5);
        assert_eq!(rejected.load(Ordering::SeqCst), 5);
        assert_eq!(state.stock_api.current_stock(item.menu_item_id).unwrap(), 0);
        assert_eq!(state.order_api.count_orders_by_status(OrderStatus::Pending).unwrap(), 5);
        assert_eq!(state.order_api.total_quantity_ordered(item.menu_item_id).unwrap(), 5);

        println!("✅ 10 笔并发订单争抢 5 份库存，恰好 5 笔成功");
    }

    // ==========================================
    // 测试2: 交叉多行订单
    // ==========================================

    #[test]
    fn test_concurrent_multi_line_orders_are_all_or_nothing() {
        let (_tmp, state) = create_test_state();
        let restaurant = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Combo Shop").all_day().build())
            .unwrap();
        let a = state
            .menu_item_api
            .create_menu_item(restaurant.restaurant_id, &MenuItemBuilder::new("Burger").stock(3).build())
            .unwrap()
            .menu_item_id;
        let b = state
            .menu_item_api
            .create_menu_item(restaurant.restaurant_id, &MenuItemBuilder::new("Fries").stock(3).build())
            .unwrap()
            .menu_item_id;

        let created = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let api = state.order_api.clone();
                let created = created.clone();
                // 一半线程反向下单，制造交叉预占
                let (first, second) = if i % 2 == 0 { (a, b) } else { (b, a) };
                let request = OrderRequestBuilder::new(restaurant.restaurant_id)
                    .line(first, 1)
                    .line(second, 1)
                    .build();
                thread::spawn(move || {
                    if api.create_order(&request).is_ok() {
                        created.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let created = created.load(Ordering::SeqCst) as i32;
        let stock_a = state.stock_api.current_stock(a).unwrap();
        let stock_b = state.stock_api.current_stock(b).unwrap();
        assert_eq!(stock_a, 3 - created);
        assert_eq!(stock_b, 3 - created);
        assert_eq!(
            state.order_api.total_quantity_ordered(a).unwrap(),
            created as i64
        );
    }

    // ==========================================
    // 测试3: 并发取消同一订单
    // ==========================================

    #[test]
    fn test_concurrent_cancel_releases_exactly_once() {
        let (_tmp, state) = create_test_state();
        let restaurant = state
            .restaurant_api
            .create_restaurant(&RestaurantBuilder::new("Cancel Race").all_day().build())
            .unwrap();
        let item = state
            .menu_item_api
            .create_menu_item(restaurant.restaurant_id, &MenuItemBuilder::new("Pho").stock(4).build())
            .unwrap()
            .menu_item_id;
        let order = state
            .order_api
            .create_order(&OrderRequestBuilder::new(restaurant.restaurant_id).line(item, 4).build())
            .unwrap();
        assert_eq!(state.stock_api.current_stock(item).unwrap(), 0);

        let succeeded = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let api = state.order_api.clone();
                let succeeded = succeeded.clone();
                let order_id = order.order_id;
                thread::spawn(move || match api.cancel_order(order_id) {
                    Ok(_) => {
                        succeeded.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(ApiError::InvalidStateTransition { .. }) => {}
                    Err(e) => panic!("unexpected: {}", e),
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(succeeded.load(Ordering::SeqCst), 1);
        assert_eq!(state.stock_api.current_stock(item).unwrap(), 4);
        let releases = state
            .stock_api
            .list_movements(item)
            .unwrap()
            .into_iter()
            .filter(|m| m.movement_type == StockMovementType::Release)
            .count();
        assert_eq!(releases, 1);

        println!("✅ 8 个线程并发取消同一订单，只回补一次");
    }
}
