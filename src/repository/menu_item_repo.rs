// ==========================================
// 外卖订单系统 - 菜品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 本仓储不提供库存写入，库存只经由 StockRepository 的条件更新变动
// ==========================================

use crate::domain::menu_item::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::repository::codec::{format_money, format_timestamp, money_at, timestamp_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"SELECT menu_item_id, restaurant_id, name, description, price,
       category, is_available, stock_quantity, created_at, updated_at
FROM menu_item"#;

// ==========================================
// MenuItemRepository - 菜品仓储
// ==========================================
pub struct MenuItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MenuItemRepository {
    /// 创建新的MenuItemRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub(crate) fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MenuItem> {
        Ok(MenuItem {
            menu_item_id: row.get(0)?,
            restaurant_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price: money_at(row, 4)?,
            category: row.get(5)?,
            is_available: row.get::<_, i32>(6)? != 0,
            stock_quantity: row.get(7)?,
            created_at: timestamp_at(row, 8)?,
            updated_at: timestamp_at(row, 9)?,
        })
    }

    fn query_list(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Vec<MenuItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建菜品
    ///
    /// # 错误
    /// - `ForeignKeyViolation`: restaurant_id 不存在
    /// - `CheckConstraintViolation`: 初始库存为负
    pub fn insert(&self, restaurant_id: i64, draft: &MenuItemDraft, now: NaiveDateTime) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO menu_item (
                restaurant_id, name, description, price, category,
                is_available, stock_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"#,
            params![
                restaurant_id,
                draft.name,
                draft.description,
                format_money(&draft.price),
                draft.category,
                draft.is_available as i32,
                draft.stock_quantity,
                format_timestamp(&now),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 更新菜品基本信息（不含库存）
    pub fn update(&self, menu_item_id: i64, patch: &MenuItemPatch, now: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE menu_item
               SET name = ?1, description = ?2, price = ?3, category = ?4,
                   is_available = ?5, updated_at = ?6
               WHERE menu_item_id = ?7"#,
            params![
                patch.name,
                patch.description,
                format_money(&patch.price),
                patch.category,
                patch.is_available as i32,
                format_timestamp(&now),
                menu_item_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("MenuItem", menu_item_id));
        }
        Ok(())
    }

    /// 删除菜品（物理删除，历史订单行保留快照）
    pub fn delete(&self, menu_item_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM menu_item WHERE menu_item_id = ?1",
            params![menu_item_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("MenuItem", menu_item_id));
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, menu_item_id: i64) -> RepositoryResult<Option<MenuItem>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE menu_item_id = ?1", SELECT_COLUMNS);
        let found = conn
            .query_row(&sql, params![menu_item_id], Self::map_row)
            .optional()?;
        Ok(found)
    }

    /// 查询餐厅的全部菜品
    pub fn find_by_restaurant(&self, restaurant_id: i64) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!("{} WHERE restaurant_id = ?1 ORDER BY menu_item_id", SELECT_COLUMNS);
        self.query_list(&sql, &[&restaurant_id])
    }

    /// 查询餐厅的上架菜品
    pub fn find_available_by_restaurant(&self, restaurant_id: i64) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 AND is_available = 1 ORDER BY menu_item_id",
            SELECT_COLUMNS
        );
        self.query_list(&sql, &[&restaurant_id])
    }

    /// 按分类查询
    pub fn find_by_category(&self, category: &str) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!("{} WHERE category = ?1 ORDER BY menu_item_id", SELECT_COLUMNS);
        self.query_list(&sql, &[&category])
    }

    /// 按价格区间查询（闭区间）
    ///
    /// 价格以十进制文本存储，比较放在 Decimal 上做，避免 CAST 成浮点
    pub fn find_by_price_range(&self, min_price: Decimal, max_price: Decimal) -> RepositoryResult<Vec<MenuItem>> {
        let sql = format!("{} ORDER BY menu_item_id", SELECT_COLUMNS);
        let items = self
            .query_list(&sql, &[])?
            .into_iter()
            .filter(|item| item.price >= min_price && item.price <= max_price)
            .collect();
        Ok(items)
    }
}
