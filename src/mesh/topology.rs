/// Landmark count of the base face mesh.
pub const BASE_LANDMARK_COUNT: usize = 468;

/// Landmark count when iris refinement is enabled (base mesh plus 10 iris points).
pub const REFINED_LANDMARK_COUNT: usize = 478;

/// Indices of the mesh vertices the engine reads.
///
/// Names follow the subject's anatomy, not the screen: the subject's right eye
/// sits on the left half of an unmirrored frame. Preview surfaces that mirror
/// the composed frame flip the whole image, so these indices never change with
/// mirroring.
pub mod landmark {
    /// Outer corner of the subject's right eye.
    pub const RIGHT_EYE_OUTER: usize = 33;
    /// Inner corner of the subject's right eye.
    pub const RIGHT_EYE_INNER: usize = 133;
    /// Upper lid of the subject's right eye.
    pub const RIGHT_EYE_TOP: usize = 159;
    /// Inner corner of the subject's left eye.
    pub const LEFT_EYE_INNER: usize = 362;
    /// Outer corner of the subject's left eye.
    pub const LEFT_EYE_OUTER: usize = 263;
    /// Outermost point of the subject's right cheek.
    pub const RIGHT_CHEEK: usize = 234;
    /// Outermost point of the subject's left cheek.
    pub const LEFT_CHEEK: usize = 454;
    /// Top of the nose bridge, between the eyes.
    pub const NOSE_BRIDGE: usize = 168;
    /// Tip of the nose.
    pub const NOSE_TIP: usize = 2;
    /// Temple area on the subject's left side.
    pub const LEFT_TEMPLE: usize = 447;
    /// Triangle over the subject's right cheek, wound consistently.
    pub const RIGHT_CHEEK_TRIANGLE: [usize; 3] = [123, 147, 162];
    /// Triangle over the subject's left cheek, wound consistently.
    pub const LEFT_CHEEK_TRIANGLE: [usize; 3] = [352, 377, 392];
}
