// ==========================================
// 船舶遥测数据系统 - 字段范围校验
// ==========================================
// 职责: 类型化字段 → 警告文本列表
// 红线: 只报告，不修改、不拒绝；跳过与否由表处理器决定
// ==========================================

/// 闭区间范围检查（None 视为通过）
fn out_of_range(value: Option<f64>, min: f64, max: f64) -> bool {
    matches!(value, Some(v) if v < min || v > max)
}

fn negative(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v < 0.0)
}

/// 主机数据校验（温度不校验）
pub fn validate_engine(rpm: Option<f64>, oil_pressure: Option<f64>) -> Vec<String> {
    let mut warnings = Vec::new();

    if negative(rpm) {
        warnings.push("negative rpm".to_string());
    }
    if negative(oil_pressure) {
        warnings.push("negative oil pressure".to_string());
    }

    warnings
}

/// 油舱数据校验
pub fn validate_fuel(level_percent: Option<f64>, volume_liters: Option<f64>) -> Vec<String> {
    let mut warnings = Vec::new();

    if out_of_range(level_percent, 0.0, 100.0) {
        warnings.push("invalid fuel level percentage".to_string());
    }
    if negative(volume_liters) {
        warnings.push("negative fuel volume".to_string());
    }

    warnings
}

/// 发电机数据校验
pub fn validate_generator(
    load_kw: Option<f64>,
    voltage_v: Option<f64>,
    frequency_hz: Option<f64>,
    fuel_rate_lph: Option<f64>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if negative(load_kw) {
        warnings.push("negative generator load".to_string());
    }
    if negative(voltage_v) {
        warnings.push("negative voltage".to_string());
    }
    if out_of_range(frequency_hz, 45.0, 70.0) {
        warnings.push("frequency out of range (45-70 Hz)".to_string());
    }
    if negative(fuel_rate_lph) {
        warnings.push("negative fuel rate".to_string());
    }

    warnings
}

/// 船位数据校验
pub fn validate_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    course: Option<f64>,
    speed: Option<f64>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if out_of_range(latitude, -90.0, 90.0) {
        warnings.push("latitude out of range (-90 to 90)".to_string());
    }
    if out_of_range(longitude, -180.0, 180.0) {
        warnings.push("longitude out of range (-180 to 180)".to_string());
    }
    if out_of_range(course, 0.0, 360.0) {
        warnings.push("course out of range (0-360 degrees)".to_string());
    }
    if negative(speed) {
        warnings.push("negative speed".to_string());
    }

    warnings
}
