/// Generate a unique ID for an outline node.
///
/// Returns a 23-character URL-friendly string.
pub fn generate_id() -> String {
    nanoid::nanoid!(23)
}
