// ==========================================
// 外卖订单系统 - 订单数据仓储
// ==========================================
// 红线: 订单头与订单行在同一事务内写入，不存在"半个订单"
// 红线: 状态变更使用 CAS（WHERE status = 期望状态），并发下只有一个写入者成功
// 红线: 取消 = 状态 CAS + 全部行库存回补，同一事务提交
// ==========================================

use crate::domain::order::{NewOrder, Order, OrderItem};
use crate::domain::types::OrderStatus;
use crate::repository::codec::{format_money, format_timestamp, money_at, timestamp_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stock_repo::release_in;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

const SELECT_ORDER_COLUMNS: &str = r#"SELECT order_id, order_number, restaurant_id, customer_name,
       customer_phone, delivery_address, total_amount, status, notes, created_at, updated_at
FROM customer_order"#;

/// 取消时单行库存回补结果
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasedLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    /// None: 菜品已被删除，跳过回补
    pub stock_after: Option<i32>,
}

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的OrderRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 订单头映射（items 由 load_items 单独填充）
    fn map_order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
        let raw_status: String = row.get(7)?;
        let status = OrderStatus::from_db_str(&raw_status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("未知订单状态: {}", raw_status).into(),
            )
        })?;

        Ok(Order {
            order_id: row.get(0)?,
            order_number: row.get(1)?,
            restaurant_id: row.get(2)?,
            customer_name: row.get(3)?,
            customer_phone: row.get(4)?,
            delivery_address: row.get(5)?,
            items: Vec::new(),
            total_amount: money_at(row, 6)?,
            status,
            notes: row.get(8)?,
            created_at: timestamp_at(row, 9)?,
            updated_at: timestamp_at(row, 10)?,
        })
    }

    fn map_item_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderItem> {
        Ok(OrderItem {
            order_item_id: row.get(0)?,
            order_id: row.get(1)?,
            menu_item_id: row.get(2)?,
            menu_item_name: row.get(3)?,
            quantity: row.get(4)?,
            unit_price: money_at(row, 5)?,
            subtotal: money_at(row, 6)?,
        })
    }

    fn load_items(conn: &Connection, order_id: i64) -> RepositoryResult<Vec<OrderItem>> {
        let mut stmt = conn.prepare(
            r#"SELECT order_item_id, order_id, menu_item_id, menu_item_name, quantity, unit_price, subtotal
               FROM order_item
               WHERE order_id = ?1
               ORDER BY order_item_id"#,
        )?;
        let items = stmt
            .query_map(params![order_id], Self::map_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 查询订单列表并填充订单行
    fn query_orders(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let mut orders = stmt
            .query_map(args, Self::map_order_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for order in orders.iter_mut() {
            order.items = Self::load_items(&conn, order.order_id)?;
        }
        Ok(orders)
    }

    fn query_one(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Option<Order>> {
        Ok(self.query_orders(sql, args)?.into_iter().next())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 写入订单聚合（订单头 + 全部订单行），初始状态 PENDING
    ///
    /// # 错误
    /// - `UniqueConstraintViolation("... customer_order.order_number")`: 订单号冲突，
    ///   事务回滚，调用方可换号重试
    pub fn insert_aggregate(&self, new_order: &NewOrder) -> RepositoryResult<Order> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let ts = format_timestamp(&new_order.created_at);

        tx.execute(
            r#"INSERT INTO customer_order (
                order_number, restaurant_id, customer_name, customer_phone, delivery_address,
                total_amount, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"#,
            params![
                new_order.order_number,
                new_order.restaurant_id,
                new_order.customer_name,
                new_order.customer_phone,
                new_order.delivery_address,
                format_money(&new_order.total_amount),
                OrderStatus::Pending.to_db_str(),
                new_order.notes,
                ts,
            ],
        )?;
        let order_id = tx.last_insert_rowid();

        let mut items = Vec::with_capacity(new_order.lines.len());
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO order_item (
                    order_id, menu_item_id, menu_item_name, quantity, unit_price, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            )?;
            for line in &new_order.lines {
                stmt.execute(params![
                    order_id,
                    line.menu_item_id,
                    line.menu_item_name,
                    line.quantity,
                    format_money(&line.unit_price),
                    format_money(&line.subtotal),
                ])?;
                items.push(OrderItem {
                    order_item_id: tx.last_insert_rowid(),
                    order_id,
                    menu_item_id: line.menu_item_id,
                    menu_item_name: line.menu_item_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal,
                });
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(Order {
            order_id,
            order_number: new_order.order_number.clone(),
            restaurant_id: new_order.restaurant_id,
            customer_name: new_order.customer_name.clone(),
            customer_phone: new_order.customer_phone.clone(),
            delivery_address: new_order.delivery_address.clone(),
            items,
            total_amount: new_order.total_amount,
            status: OrderStatus::Pending,
            notes: new_order.notes.clone(),
            created_at: new_order.created_at,
            updated_at: new_order.created_at,
        })
    }

    /// 状态 CAS: 仅当当前状态等于 expected 时写入 next
    ///
    /// # 返回
    /// - `Ok(true)`: 更新成功
    /// - `Ok(false)`: 订单不存在或状态已被并发修改
    pub fn update_status_cas(
        &self,
        order_id: i64,
        expected: OrderStatus,
        next: OrderStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE customer_order
               SET status = ?1, updated_at = ?2
               WHERE order_id = ?3 AND status = ?4"#,
            params![next.to_db_str(), format_timestamp(&now), order_id, expected.to_db_str()],
        )?;
        Ok(rows > 0)
    }

    /// 取消订单并回补全部订单行库存（同一事务）
    ///
    /// # 返回
    /// - `Ok(Some(lines))`: 取消成功，返回每行回补结果
    /// - `Ok(None)`: 状态 CAS 失败（订单不存在或状态已变），未做任何修改
    pub fn cancel_with_release(
        &self,
        order_id: i64,
        expected: OrderStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<Option<Vec<ReleasedLine>>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let order_number: Option<String> = tx
            .query_row(
                r#"UPDATE customer_order
                   SET status = ?1, updated_at = ?2
                   WHERE order_id = ?3 AND status = ?4
                   RETURNING order_number"#,
                params![
                    OrderStatus::Cancelled.to_db_str(),
                    format_timestamp(&now),
                    order_id,
                    expected.to_db_str()
                ],
                |row| row.get(0),
            )
            .optional()?;

        let order_number = match order_number {
            Some(n) => n,
            None => return Ok(None),
        };

        let items = Self::load_items(&tx, order_id)?;
        let mut released = Vec::with_capacity(items.len());
        for item in items {
            let stock_after = release_in(&tx, item.menu_item_id, item.quantity, Some(&order_number), now)?;
            released.push(ReleasedLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                stock_after,
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(Some(released))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<Order>> {
        let sql = format!("{} WHERE order_id = ?1", SELECT_ORDER_COLUMNS);
        self.query_one(&sql, &[&order_id])
    }

    pub fn find_by_order_number(&self, order_number: &str) -> RepositoryResult<Option<Order>> {
        let sql = format!("{} WHERE order_number = ?1", SELECT_ORDER_COLUMNS);
        self.query_one(&sql, &[&order_number])
    }

    /// 只读当前状态（不加载订单行）
    pub fn find_status(&self, order_id: i64) -> RepositoryResult<Option<OrderStatus>> {
        let conn = self.get_conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT status FROM customer_order WHERE order_id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some(s) => OrderStatus::from_db_str(&s).map(Some).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "status".to_string(),
                    message: format!("未知订单状态: {}", s),
                }
            }),
        }
    }

    pub fn find_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE status = ?1 ORDER BY created_at DESC, order_id DESC",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&status.to_db_str()])
    }

    pub fn find_by_customer_phone(&self, phone: &str) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE customer_phone = ?1 ORDER BY created_at DESC, order_id DESC",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&phone])
    }

    pub fn find_by_restaurant(&self, restaurant_id: i64, limit: i64, offset: i64) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 ORDER BY created_at DESC, order_id DESC LIMIT ?2 OFFSET ?3",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&restaurant_id, &limit, &offset])
    }

    pub fn find_recent(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} ORDER BY created_at DESC, order_id DESC LIMIT ?1 OFFSET ?2",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&limit, &offset])
    }

    pub fn find_by_restaurant_and_status(
        &self,
        restaurant_id: i64,
        status: OrderStatus,
    ) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 AND status = ?2 ORDER BY created_at DESC, order_id DESC",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&restaurant_id, &status.to_db_str()])
    }

    /// 创建时间落在 [start, end] 内的订单
    pub fn find_by_created_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE created_at >= ?1 AND created_at <= ?2 ORDER BY created_at DESC, order_id DESC",
            SELECT_ORDER_COLUMNS
        );
        self.query_orders(&sql, &[&format_timestamp(&start), &format_timestamp(&end)])
    }

    /// 订单总额严格大于 amount 的订单
    ///
    /// 金额以十进制文本存储，比较在内存中按 Decimal 进行
    pub fn find_above_amount(&self, amount: Decimal) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at DESC, order_id DESC", SELECT_ORDER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut orders = stmt
            .query_map([], Self::map_order_row)?
            .filter(|row| !matches!(row, Ok(order) if order.total_amount <= amount))
            .collect::<Result<Vec<_>, _>>()?;

        for order in orders.iter_mut() {
            order.items = Self::load_items(&conn, order.order_id)?;
        }
        Ok(orders)
    }

    pub fn count_by_status(&self, status: OrderStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM customer_order WHERE status = ?1",
            params![status.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 菜品在未取消订单中的累计下单数量
    pub fn total_quantity_ordered(&self, menu_item_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total = conn.query_row(
            r#"SELECT COALESCE(SUM(oi.quantity), 0)
               FROM order_item oi
               JOIN customer_order o ON o.order_id = oi.order_id
               WHERE oi.menu_item_id = ?1 AND o.status <> ?2"#,
            params![menu_item_id, OrderStatus::Cancelled.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}
