// ==========================================
// 外卖订单系统 - 餐厅数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 餐厅不做物理删除，仅软停用
// ==========================================

use crate::domain::restaurant::{Restaurant, RestaurantDraft};
use crate::repository::codec::{format_time, format_timestamp, time_at, timestamp_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"SELECT restaurant_id, name, description, address, phone,
       is_active, opening_time, closing_time, created_at, updated_at
FROM restaurant"#;

// ==========================================
// RestaurantRepository - 餐厅仓储
// ==========================================
pub struct RestaurantRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RestaurantRepository {
    /// 创建新的RestaurantRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Restaurant> {
        Ok(Restaurant {
            restaurant_id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            address: row.get(3)?,
            phone: row.get(4)?,
            is_active: row.get::<_, i32>(5)? != 0,
            opening_time: time_at(row, 6)?,
            closing_time: time_at(row, 7)?,
            created_at: timestamp_at(row, 8)?,
            updated_at: timestamp_at(row, 9)?,
        })
    }

    fn query_list(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RepositoryResult<Vec<Restaurant>> {
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

    /// 新建餐厅
    ///
    /// # 返回
    /// - `Ok(restaurant_id)`
    /// - `Err(UniqueConstraintViolation)`: 名称（不区分大小写）已存在
    pub fn insert(&self, draft: &RestaurantDraft, now: NaiveDateTime) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let ts = format_timestamp(&now);

        conn.execute(
            r#"INSERT INTO restaurant (
                name, description, address, phone, is_active,
                opening_time, closing_time, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"#,
            params![
                draft.name,
                draft.description,
                draft.address,
                draft.phone,
                draft.is_active as i32,
                format_time(&draft.opening_time),
                format_time(&draft.closing_time),
                ts,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 整体更新餐厅信息
    pub fn update(&self, restaurant_id: i64, draft: &RestaurantDraft, now: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE restaurant
               SET name = ?1, description = ?2, address = ?3, phone = ?4, is_active = ?5,
                   opening_time = ?6, closing_time = ?7, updated_at = ?8
               WHERE restaurant_id = ?9"#,
            params![
                draft.name,
                draft.description,
                draft.address,
                draft.phone,
                draft.is_active as i32,
                format_time(&draft.opening_time),
                format_time(&draft.closing_time),
                format_timestamp(&now),
                restaurant_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("Restaurant", restaurant_id));
        }
        Ok(())
    }

    /// 设置营业标记（软删除 = false）
    pub fn set_active(&self, restaurant_id: i64, active: bool, now: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE restaurant SET is_active = ?1, updated_at = ?2 WHERE restaurant_id = ?3",
            params![active as i32, format_timestamp(&now), restaurant_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("Restaurant", restaurant_id));
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, restaurant_id: i64) -> RepositoryResult<Option<Restaurant>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE restaurant_id = ?1", SELECT_COLUMNS);
        let found = conn
            .query_row(&sql, params![restaurant_id], Self::map_row)
            .optional()?;
        Ok(found)
    }

    /// 名称是否已被占用（不区分大小写，可排除自身）
    pub fn exists_by_name_ignore_case(&self, name: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM restaurant
               WHERE name = ?1 COLLATE NOCASE AND (?2 IS NULL OR restaurant_id <> ?2)"#,
            params![name, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 查询全部餐厅
    pub fn find_all(&self) -> RepositoryResult<Vec<Restaurant>> {
        let sql = format!("{} ORDER BY restaurant_id", SELECT_COLUMNS);
        self.query_list(&sql, &[])
    }

    /// 查询营业中的餐厅
    pub fn find_active(&self) -> RepositoryResult<Vec<Restaurant>> {
        let sql = format!("{} WHERE is_active = 1 ORDER BY restaurant_id", SELECT_COLUMNS);
        self.query_list(&sql, &[])
    }

    /// 营业中且至少有一个上架菜品的餐厅
    pub fn find_with_available_items(&self) -> RepositoryResult<Vec<Restaurant>> {
        let sql = format!(
            r#"{} WHERE is_active = 1
               AND EXISTS (SELECT 1 FROM menu_item m
                           WHERE m.restaurant_id = restaurant.restaurant_id AND m.is_available = 1)
               ORDER BY restaurant_id"#,
            SELECT_COLUMNS
        );
        self.query_list(&sql, &[])
    }

    /// 按名称关键字模糊搜索（不区分大小写）
    pub fn search_by_name(&self, keyword: &str) -> RepositoryResult<Vec<Restaurant>> {
        let escaped = keyword
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let sql = format!(
            "{} WHERE name LIKE '%' || ?1 || '%' ESCAPE '\\' ORDER BY name",
            SELECT_COLUMNS
        );
        self.query_list(&sql, &[&escaped])
    }
}
