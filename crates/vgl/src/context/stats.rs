/// Snapshot taken each time a frame is sealed.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Stats {
    /// CPU time between the last two `frame()` calls.
    pub cpu_time_ms: f64,
    pub num_draw_calls: u32,
    /// Draws dropped for empty geometry or a full frame.
    pub num_dropped: u32,
    /// Distinct views referenced by the frame's draw calls.
    pub num_views: u32,

    pub num_vertex_layouts: u16,
    pub num_vertex_buffers: u16,
    pub num_index_buffers: u16,
    pub num_shaders: u16,
    pub num_programs: u16,
    pub num_textures: u16,
    pub num_frame_buffers: u16,

    pub width: u16,
    pub height: u16,
}
