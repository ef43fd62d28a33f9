//! GLSL sources for the point-sprite pipeline

pub const POINT_VERTEX: &str = r#"#version 330 core

layout (location = 0) in vec3 a_position;
layout (location = 1) in vec3 a_color;
layout (location = 2) in float a_size;
layout (location = 3) in float a_alpha;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_point_scale;
uniform float u_min_point_size;

out vec3 v_color;
out float v_alpha;
out float v_seed;

void main() {
    vec4 view_position = u_view * vec4(a_position, 1.0);
    gl_Position = u_projection * view_position;

    float depth = max(-view_position.z, 0.001);
    gl_PointSize = max(a_size * u_point_scale / depth, u_min_point_size);

    v_color = a_color;
    v_alpha = a_alpha;
    v_seed = fract(sin(dot(a_position.xy, vec2(12.9898, 78.233))) * 43758.5453) * 6.2831;
}
"#;

pub const POINT_FRAGMENT: &str = r#"#version 330 core

in vec3 v_color;
in float v_alpha;
in float v_seed;

uniform sampler2D u_sprite;
uniform float u_time;
uniform float u_flicker;

out vec4 frag_color;

void main() {
    vec4 sprite = texture(u_sprite, gl_PointCoord);
    float flicker = 1.0 - u_flicker * 0.15 * (0.5 + 0.5 * sin(u_time * 18.0 + v_seed));
    frag_color = vec4(sprite.rgb * v_color, sprite.a * v_alpha * flicker);
    if (frag_color.a <= 0.002) {
        discard;
    }
}
"#;
