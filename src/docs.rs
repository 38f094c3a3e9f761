use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, CalendarDay, CalendarQuery, CalendarResponse,
    CalendarSummary, CorrectAttendance,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::network::{AdminIpEntry, AdminIpListResponse, IpPayload};
use crate::api::shift::{UpdateShiftRules, UpdateShiftSettings};
use crate::logic::attendance::{AttendanceStatus, Classification, ShiftConfig};
use crate::logic::network::Authorization;
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WiFi Attendance API",
        version = "1.0.0",
        description = r#"
## WiFi-Restricted Employee Attendance Tracker

Backend for a role-gated attendance system: check-in/check-out, attendance
history, shift configuration, and an IP-allowlist network heuristic.

### Key Features
- **Attendance**
  - Daily check-in and check-out with automatic status classification
    (present / late / half-day), monthly history and a calendar view that
    derives absences and loss-of-pay figures
- **Shift Settings**
  - One active shift window with late and early-checkout thresholds, plus
    the company rules document
- **Network Access Control**
  - Admin IP allowlist with a /24 same-network heuristic. Advisory only:
    client addresses are spoofable, so the check is layered under JWT
    authentication and never gates access by itself
- **Employee Management**
  - Create, update, list, and view employee profiles

### Security
Protected endpoints use **JWT Bearer authentication**. Mutating operations
require the **Admin** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_calendar,
        crate::api::attendance::correct_attendance,

        crate::api::shift::get_settings,
        crate::api::shift::update_settings,
        crate::api::shift::get_rules,
        crate::api::shift::update_rules,

        crate::api::network::list_ips,
        crate::api::network::add_ip,
        crate::api::network::remove_ip,
        crate::api::network::clear_ips,
        crate::api::network::check_access,
        crate::api::network::client_ip,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            Attendance,
            AttendanceQuery,
            AttendanceListResponse,
            AttendanceStatus,
            CalendarQuery,
            CalendarDay,
            CalendarSummary,
            CalendarResponse,
            Classification,
            CorrectAttendance,
            ShiftConfig,
            UpdateShiftSettings,
            UpdateShiftRules,
            Authorization,
            AdminIpEntry,
            AdminIpListResponse,
            IpPayload,
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeQuery,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in/out and attendance history APIs"),
        (name = "Shift", description = "Shift configuration and company rules APIs"),
        (name = "Network", description = "Admin IP allowlist and network heuristic APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;
