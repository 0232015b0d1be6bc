/// WGSL shader for lit, fogged, instanced boxes.
///
/// Lighting is a single directional Lambert term with no ambient, so faces
/// turned away from the light render black before fog is applied. Fog is
/// exponential-squared on eye distance.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz: direction towards the light, w: intensity
    light: vec4<f32>,
    // rgb: fog colour, a: density
    fog: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    // Models are axis-aligned scales, so the normal only needs renormalising.
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let diffuse = max(dot(in.world_normal, uniforms.light.xyz), 0.0) * uniforms.light.w;
    let lit = in.color.rgb * diffuse;

    let depth = distance(in.world_pos, uniforms.camera_pos.xyz);
    let density = uniforms.fog.a;
    let fog_factor = clamp(1.0 - exp(-density * density * depth * depth), 0.0, 1.0);
    return vec4<f32>(mix(lit, uniforms.fog.rgb, fog_factor), in.color.a);
}
"#;
