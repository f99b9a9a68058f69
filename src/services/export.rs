use std::io::Write;

use crate::models::role::RoleDto;

pub const ROLE_CSV_HEADER: &str = "id,name,level,description,data_scope,created_at";

pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write roles as CSV, header first, one line per role.
pub fn write_roles_csv<W: Write>(roles: &[RoleDto], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{ROLE_CSV_HEADER}")?;
    for r in roles {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            r.id,
            escape_csv(&r.name),
            r.level,
            escape_csv(&r.description),
            r.data_scope.as_str(),
            escape_csv(&r.created_at),
        )?;
    }
    out.flush()
}
