use rusqlite::types::ToSql;

/// Builder for the class selection that feeds report planning.
///
/// Every constraint is bound as a parameter; values never reach the SQL text.
/// Constraints combine with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassQuery {
    class_id: Option<i64>,
    course_id: Option<i64>,
    teacher_id: Option<i64>,
}

impl ClassQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, id: i64) -> Self {
        self.class_id = Some(id);
        self
    }

    pub fn course(mut self, id: i64) -> Self {
        self.course_id = Some(id);
        self
    }

    pub fn teacher(mut self, id: i64) -> Self {
        self.teacher_id = Some(id);
        self
    }

    pub fn class_id(&self) -> Option<i64> {
        self.class_id
    }

    pub fn course_id(&self) -> Option<i64> {
        self.course_id
    }

    pub fn teacher_id(&self) -> Option<i64> {
        self.teacher_id
    }

    pub(crate) fn build_sql(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let mut wheres = Vec::new();
        let mut param_idx = 1;

        let select = "SELECT c.class_id, c.name, c.course_id, COALESCE(co.name, '') AS course_name,
                c.teacher_id, t.name AS teacher_name, c.start_date
            FROM classes c
            LEFT JOIN courses co ON co.course_id = c.course_id
            LEFT JOIN teachers t ON t.teacher_id = c.teacher_id";

        if let Some(id) = self.class_id {
            wheres.push(format!("c.class_id = ?{param_idx}"));
            params.push(Box::new(id));
            param_idx += 1;
        }

        if let Some(id) = self.course_id {
            wheres.push(format!("c.course_id = ?{param_idx}"));
            params.push(Box::new(id));
            param_idx += 1;
        }

        if let Some(id) = self.teacher_id {
            wheres.push(format!("c.teacher_id = ?{param_idx}"));
            params.push(Box::new(id));
        }

        let mut sql = select.to_string();
        if !wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&wheres.join(" AND "));
        }
        sql.push_str(" ORDER BY c.class_id ASC");

        (sql, params)
    }
}
